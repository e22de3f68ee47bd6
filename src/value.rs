//! Registry data values and their textual encodings.
//!
//! A value line in a `.reg` file carries its data in one of a few textual
//! forms:
//!
//! ```text
//! "Name"="a string with \"quotes\""
//! "Name"=dword:0000002a
//! "Name"=hex:de,ad,be,ef
//! "Name"=hex(7):41,00,00,00,00,00
//! ```
//!
//! [`Data::parse`] decodes these into a [`Data`]; [`Data`]'s `Display` gives
//! the canonical form used for comparison and [`Data::command_string`] the
//! form passed to `reg ADD /d`.

use crate::error::{RegistryError, Result};
use crate::utils::{escape_string, format_hex_list, is_hex_digits, parse_hex_list, parse_quoted_string};
use std::fmt;
use std::str::FromStr;

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DataType {
    /// No value type.
    None,

    /// String (null-terminated).
    String,

    /// String with environment variables.
    ExpandString,

    /// Binary data.
    Binary,

    /// 32-bit little-endian integer.
    Dword,

    /// 32-bit big-endian integer.
    DwordBigEndian,

    /// Symbolic link (Unicode).
    Link,

    /// Multiple strings.
    MultiString,

    /// Resource list.
    ResourceList,

    /// Full resource descriptor.
    FullResourceDescriptor,

    /// Resource requirements list.
    ResourceRequirementsList,

    /// 64-bit little-endian integer.
    Qword,

    /// Any other type code.
    Unknown(u32),
}

impl DataType {
    /// Maps a raw type code to a data type. Codes past 11 become `Unknown`.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => DataType::None,
            1 => DataType::String,
            2 => DataType::ExpandString,
            3 => DataType::Binary,
            4 => DataType::Dword,
            5 => DataType::DwordBigEndian,
            6 => DataType::Link,
            7 => DataType::MultiString,
            8 => DataType::ResourceList,
            9 => DataType::FullResourceDescriptor,
            10 => DataType::ResourceRequirementsList,
            11 => DataType::Qword,
            _ => DataType::Unknown(value),
        }
    }

    /// Returns the raw type code.
    pub fn as_u32(&self) -> u32 {
        match self {
            DataType::None => 0,
            DataType::String => 1,
            DataType::ExpandString => 2,
            DataType::Binary => 3,
            DataType::Dword => 4,
            DataType::DwordBigEndian => 5,
            DataType::Link => 6,
            DataType::MultiString => 7,
            DataType::ResourceList => 8,
            DataType::FullResourceDescriptor => 9,
            DataType::ResourceRequirementsList => 10,
            DataType::Qword => 11,
            DataType::Unknown(value) => *value,
        }
    }

    /// Returns the full name of this data type.
    pub fn name(&self) -> String {
        match self {
            DataType::None => "REG_NONE".to_string(),
            DataType::String => "REG_SZ".to_string(),
            DataType::ExpandString => "REG_EXPAND_SZ".to_string(),
            DataType::Binary => "REG_BINARY".to_string(),
            DataType::Dword => "REG_DWORD".to_string(),
            DataType::DwordBigEndian => "REG_DWORD_BIG_ENDIAN".to_string(),
            DataType::Link => "REG_LINK".to_string(),
            DataType::MultiString => "REG_MULTI_SZ".to_string(),
            DataType::ResourceList => "REG_RESOURCE_LIST".to_string(),
            DataType::FullResourceDescriptor => "REG_FULL_RESOURCE_DESCRIPTOR".to_string(),
            DataType::ResourceRequirementsList => "REG_RESOURCE_REQUIREMENTS_LIST".to_string(),
            DataType::Qword => "REG_QWORD".to_string(),
            DataType::Unknown(value) => format!("REG_UNKNOWN_{:#010x}", value),
        }
    }

    /// Returns the `/t` argument used by `reg ADD` for this type.
    ///
    /// Only the types `reg` knows how to take as `/d` text are named; the rest
    /// are added as `REG_NONE` with their raw bytes.
    pub fn command_name(&self) -> &'static str {
        match self {
            DataType::String => "REG_SZ",
            DataType::ExpandString => "REG_EXPAND_SZ",
            DataType::Binary => "REG_BINARY",
            DataType::Dword => "REG_DWORD",
            DataType::MultiString => "REG_MULTI_SZ",
            _ => "REG_NONE",
        }
    }
}

impl From<u32> for DataType {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Parsed registry value data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Data {
    /// `REG_SZ` string, unescaped.
    String(String),

    /// `REG_DWORD` 32-bit integer.
    Dword(u32),

    /// `REG_BINARY` bytes.
    Binary(Vec<u8>),

    /// Any other type written as `hex(<type>):` (REG_NONE, REG_EXPAND_SZ,
    /// REG_MULTI_SZ, REG_LINK, ...), kept as raw bytes.
    Unknown {
        /// Type tag from the `hex(<type>)` prefix.
        data_type: DataType,
        /// Raw data bytes.
        bytes: Vec<u8>,
    },
}

impl Data {
    /// Decodes the right-hand side of a value line.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidData`] if the text matches none of the
    /// known encodings or a numeric field is malformed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wine_regdiff::{Data, DataType};
    ///
    /// assert_eq!(Data::parse("dword:0000002a").unwrap(), Data::Dword(42));
    /// let link = Data::parse("hex(6):ab,cd").unwrap();
    /// assert_eq!(link.data_type(), DataType::Link);
    /// assert_eq!(link.command_string(), "abcd");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.starts_with('"') {
            return Ok(Data::String(parse_quoted_string(s)));
        }

        let s = s.to_ascii_lowercase();
        if let Some(digits) = s.strip_prefix("dword:") {
            if !is_hex_digits(digits) {
                return Err(RegistryError::invalid_data(format!(
                    "failed to parse as REG_DWORD('{}'): invalid digits",
                    s
                )));
            }
            let value = u32::from_str_radix(digits, 16).map_err(|e| {
                RegistryError::invalid_data(format!("failed to parse as REG_DWORD('{}'): {}", s, e))
            })?;
            return Ok(Data::Dword(value));
        }

        if let Some(list) = s.strip_prefix("hex:") {
            return Ok(Data::Binary(parse_hex_list(list)?));
        }

        if let Some((tag, list)) = s
            .strip_prefix("hex(")
            .and_then(|rest| rest.split_once("):"))
        {
            if !is_hex_digits(tag) {
                return Err(RegistryError::invalid_data(format!(
                    "failed to parse unknown type as hex('{}'): invalid type tag",
                    s
                )));
            }
            let code = u32::from_str_radix(tag, 16).map_err(|e| {
                RegistryError::invalid_data(format!(
                    "failed to parse unknown type as hex('{}'): {}",
                    s, e
                ))
            })?;
            return Ok(Data::Unknown {
                data_type: DataType::from_u32(code),
                bytes: parse_hex_list(list)?,
            });
        }

        Err(RegistryError::invalid_data(format!("unknown input: '{}'", s)))
    }

    /// Returns the type tag of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Data::String(_) => DataType::String,
            Data::Dword(_) => DataType::Dword,
            Data::Binary(_) => DataType::Binary,
            Data::Unknown { data_type, .. } => *data_type,
        }
    }

    /// Returns the `/d` argument for `reg ADD`.
    ///
    /// Strings are escaped for a quoted argument, DWORDs are decimal and byte
    /// data is contiguous lower-case hex.
    pub fn command_string(&self) -> String {
        match self {
            Data::String(s) => escape_string(s),
            Data::Dword(d) => d.to_string(),
            Data::Binary(bytes) | Data::Unknown { bytes, .. } => hex::encode(bytes),
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::String(s) => write!(f, "\"{}\"", s),
            Data::Dword(d) => write!(f, "dword:{:08x}", d),
            Data::Binary(bytes) => write!(f, "hex:{}", format_hex_list(bytes)),
            Data::Unknown { data_type, bytes } => {
                write!(f, "hex({:x}):{}", data_type.as_u32(), format_hex_list(bytes))
            }
        }
    }
}

impl FromStr for Data {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string() {
        let data = Data::parse(r#""hello \"world\"""#).unwrap();
        assert_eq!(data, Data::String(r#"hello "world""#.to_string()));
        assert_eq!(data.data_type(), DataType::String);
        assert_eq!(data.to_string(), r#""hello "world"""#);
        assert_eq!(data.command_string(), r#"hello \"world\""#);
    }

    #[test]
    fn test_parse_string_is_case_preserving() {
        let data = Data::parse(r#""MiXeD""#).unwrap();
        assert_eq!(data, Data::String("MiXeD".to_string()));
    }

    #[test]
    fn test_parse_dword() {
        let data = Data::parse("dword:0000002a").unwrap();
        assert_eq!(data, Data::Dword(42));
        assert_eq!(data.to_string(), "dword:0000002a");
        assert_eq!(data.command_string(), "42");

        assert_eq!(Data::parse("DWORD:FFFFFFFF").unwrap(), Data::Dword(u32::MAX));
    }

    #[test]
    fn test_parse_dword_errors() {
        assert!(Data::parse("dword:").is_err());
        assert!(Data::parse("dword:xyz").is_err());
        assert!(Data::parse("dword:+1").is_err());
        assert!(Data::parse("dword:100000000").is_err());
    }

    #[test]
    fn test_parse_binary() {
        let data = Data::parse("hex:DE,ad,be,ef").unwrap();
        assert_eq!(data, Data::Binary(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(data.to_string(), "hex:de,ad,be,ef");
        assert_eq!(data.command_string(), "deadbeef");
        assert!(Data::parse("hex:de,,ef").is_err());
    }

    #[test]
    fn test_parse_empty_binary() {
        let data = Data::parse("hex:").unwrap();
        assert_eq!(data, Data::Binary(Vec::new()));
        assert_eq!(data.to_string(), "hex:");
        assert_eq!(data.command_string(), "");
    }

    #[test]
    fn test_parse_unknown() {
        let data = Data::parse("hex(6):ab,cd").unwrap();
        assert_eq!(
            data,
            Data::Unknown {
                data_type: DataType::Link,
                bytes: vec![0xab, 0xcd],
            }
        );
        assert_eq!(data.to_string(), "hex(6):ab,cd");
        assert_eq!(data.command_string(), "abcd");
    }

    #[test]
    fn test_parse_unknown_large_tag() {
        let data = Data::parse("hex(100000a):01").unwrap();
        assert_eq!(data.data_type(), DataType::Unknown(0x100000a));
        assert_eq!(data.to_string(), "hex(100000a):01");
        assert!(Data::parse("hex(zz):01").is_err());
        assert!(Data::parse("hex():01").is_err());
    }

    #[test]
    fn test_parse_unrecognized() {
        let err = Data::parse("str(2):\"%PATH%\"").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidData(_)));
        assert!(Data::parse("").is_err());
    }

    #[test]
    fn test_data_type_codes() {
        for code in 0..=11 {
            assert_eq!(DataType::from_u32(code).as_u32(), code);
        }
        assert_eq!(DataType::from(0x20), DataType::Unknown(0x20));
        assert_eq!(DataType::Link.name(), "REG_LINK");
        assert_eq!(DataType::Unknown(0x20).name(), "REG_UNKNOWN_0x00000020");
    }

    #[test]
    fn test_command_names() {
        assert_eq!(DataType::String.command_name(), "REG_SZ");
        assert_eq!(DataType::ExpandString.command_name(), "REG_EXPAND_SZ");
        assert_eq!(DataType::Binary.command_name(), "REG_BINARY");
        assert_eq!(DataType::Dword.command_name(), "REG_DWORD");
        assert_eq!(DataType::MultiString.command_name(), "REG_MULTI_SZ");
        assert_eq!(DataType::Link.command_name(), "REG_NONE");
        assert_eq!(DataType::Qword.command_name(), "REG_NONE");
        assert_eq!(DataType::None.command_name(), "REG_NONE");
    }
}
