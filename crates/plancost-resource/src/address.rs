//! Resource address handling.
//!
//! Addresses are dot-separated segments with optional bracketed indices,
//! e.g. `module.net["eu.west"].aws_instance.web[0].root_block_device`. Dots
//! inside brackets or quotes do not split segments.

use crate::error::{ResourceError, Result};

/// Split an address into its dot-separated segments.
pub fn segments(address: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in address.char_indices() {
        if in_quote {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_quote = true,
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ResourceError::malformed(address, "unbalanced ']'"))?;
            }
            '.' if depth == 0 => {
                if i == start {
                    return Err(ResourceError::malformed(address, "empty segment"));
                }
                parts.push(&address[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_quote {
        return Err(ResourceError::malformed(address, "unterminated quote"));
    }
    if depth > 0 {
        return Err(ResourceError::malformed(address, "unterminated index"));
    }
    if start >= address.len() {
        return Err(ResourceError::malformed(address, "empty segment"));
    }
    parts.push(&address[start..]);
    Ok(parts)
}

/// Remove every bracketed index from an address.
///
/// `module.m[0].aws_instance.web["a"]` becomes `module.m.aws_instance.web`.
pub fn strip_array_indices(address: &str) -> String {
    let mut out = String::with_capacity(address.len());
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    for ch in address.chars() {
        if in_quote {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '"' if depth > 0 => in_quote = true,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Number of leading segments that form the module path.
fn module_len(parts: &[&str]) -> usize {
    let mut len = 0;
    while len + 1 < parts.len() && parts[len] == "module" {
        len += 2;
    }
    len
}

/// The `module.<name>` chain at the start of an address, or `""`.
pub fn module_part(address: &str) -> Result<String> {
    let parts = segments(address)?;
    Ok(parts[..module_len(&parts)].join("."))
}

/// The address with its module chain removed.
pub fn resource_part(address: &str) -> Result<String> {
    let parts = segments(address)?;
    Ok(parts[module_len(&parts)..].join("."))
}

/// Names of the modules an address is nested in, outermost first, without
/// instance indices.
pub fn module_names(address: &str) -> Result<Vec<String>> {
    let parts = segments(address)?;
    Ok(parts[..module_len(&parts)]
        .chunks(2)
        .map(|pair| strip_array_indices(pair[1]))
        .collect())
}

/// Qualify a module-relative address with a module chain.
pub fn qualify(module_part: &str, relative: &str) -> String {
    if module_part.is_empty() {
        relative.to_string()
    } else {
        format!("{module_part}.{relative}")
    }
}

/// Address of a single nested block.
pub fn child(parent: &str, field: &str) -> String {
    format!("{parent}.{field}")
}

/// Address of one entry of a repeated nested block.
pub fn indexed_child(parent: &str, field: &str, index: usize) -> String {
    format!("{parent}.{field}[{index}]")
}
