// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Byte quantities with human-readable parsing and formatting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

/// An amount of memory in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct DataSize(u64);

impl DataSize {
    pub const fn bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn kilobytes(value: u64) -> Self {
        Self(value * KB)
    }

    pub const fn megabytes(value: u64) -> Self {
        Self(value * MB)
    }

    pub const fn gigabytes(value: u64) -> Self {
        Self(value * GB)
    }

    pub const fn terabytes(value: u64) -> Self {
        Self(value * TB)
    }

    pub const fn to_bytes(self) -> u64 {
        self.0
    }
}

impl From<u64> for DataSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for DataSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        if bytes >= TB {
            write!(f, "{:.2}TB", bytes as f64 / TB as f64)
        } else if bytes >= GB {
            write!(f, "{:.2}GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            write!(f, "{:.2}MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            write!(f, "{:.2}kB", bytes as f64 / KB as f64)
        } else {
            write!(f, "{}B", bytes)
        }
    }
}

impl FromStr for DataSize {
    type Err = String;

    /// Accepts `<number><unit>` with unit one of B, kB, MB, GB, TB
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("Missing unit in data size: '{}'", s))?;
        let (number, unit) = trimmed.split_at(split);
        let value: f64 = number
            .parse()
            .map_err(|_| format!("Invalid data size: '{}'", s))?;
        let multiplier = match unit.trim() {
            "B" => 1,
            "kB" | "KB" => KB,
            "MB" => MB,
            "GB" => GB,
            "TB" => TB,
            other => return Err(format!("Unknown data size unit '{}' in '{}'", other, s)),
        };
        let bytes = (value * multiplier as f64).round();
        // u64::MAX as f64 rounds up to 2^64, which does not fit
        if !bytes.is_finite() || bytes >= u64::MAX as f64 {
            return Err(format!("Data size out of range: '{}'", s));
        }
        Ok(DataSize(bytes as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_size() {
        assert_eq!("10GB".parse::<DataSize>(), Ok(DataSize::gigabytes(10)));
        assert_eq!("512 MB".parse::<DataSize>(), Ok(DataSize::megabytes(512)));
        assert_eq!("1.5kB".parse::<DataSize>(), Ok(DataSize::bytes(1536)));
        assert_eq!("42B".parse::<DataSize>(), Ok(DataSize::bytes(42)));
        assert!("42".parse::<DataSize>().is_err());
        assert!("12XB".parse::<DataSize>().is_err());
        assert!("GB".parse::<DataSize>().is_err());
    }

    #[test]
    fn test_parse_rejects_sizes_that_overflow() {
        assert_eq!(
            "16777216TB".parse::<DataSize>(),
            Err("Data size out of range: '16777216TB'".to_string())
        );
        assert!("99999999999999999999B".parse::<DataSize>().is_err());
        assert_eq!("16777215TB".parse::<DataSize>(), Ok(DataSize::terabytes(16_777_215)));
    }

    #[test]
    fn test_format_data_size() {
        assert_eq!(DataSize::gigabytes(25).to_string(), "25.00GB");
        assert_eq!(DataSize::megabytes(50).to_string(), "50.00MB");
        assert_eq!(DataSize::bytes(12).to_string(), "12B");
    }
}
