use std::fmt;
use std::ops::{Add, Div, Sub};

pub trait Int:
    Add<Output = Self> + Sub<Output = Self> + Div<Output = Self> + PartialOrd + PartialEq + Copy
{
    fn val(val: usize) -> Self;
}
impl Int for usize {
    fn val(val: usize) -> Self {
        val as Self
    }
}
impl Int for u64 {
    fn val(val: usize) -> Self {
        val as Self
    }
}

pub fn size_to_str<T: Int + fmt::Display>(size: T) -> String {
    if size > T::val(1024 * 1024 * 1024) {
        format!(
            "{} GiB ({} bytes)",
            size / T::val(1024 * 1024 * 1024),
            size
        )
    } else if size > T::val(1024 * 1024) {
        format!("{} MiB ({} bytes)", size / T::val(1024 * 1024), size)
    } else if size > T::val(1024) {
        format!("{} KiB ({} bytes)", size / T::val(1024), size)
    } else {
        format!("{} bytes", size)
    }
}

/// Parse a size given in units 'TiB', 'GiB', 'MiB', 'KiB' or 'B' (default).
pub fn parse_human_size(size_str: &str) -> Result<usize, String> {
    let size_str = size_str.trim();
    let split = size_str
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(size_str.len());
    let (size_val, size_unit) = size_str.split_at(split);
    let size_val: usize = size_val
        .parse()
        .map_err(|e| format!("invalid size '{}': {}", size_str, e))?;
    let multiplier: usize = match size_unit.trim() {
        "TiB" => 1024 * 1024 * 1024 * 1024,
        "GiB" => 1024 * 1024 * 1024,
        "MiB" => 1024 * 1024,
        "KiB" => 1024,
        "B" | "" => 1,
        unit => return Err(format!("invalid size unit '{}'", unit)),
    };
    size_val
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size '{}' is too big", size_str))
}
