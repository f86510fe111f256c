//! Binary module image.
//!
//! # Format
//!
//! ```text
//! +--------------------+
//! | Magic (4 bytes)    |  "SLDB"
//! +--------------------+
//! | Version (4 bytes)  |  u32 format version
//! +--------------------+
//! | Flags (4 bytes)    |  u32 compiler option bits
//! +--------------------+
//! | Length (4 bytes)   |  u32 length of the payload
//! +--------------------+
//! | Payload (N bytes)  |  bincode-serialized module instruction
//! +--------------------+
//! ```
//!
//! All header integers are little endian.

use thiserror::Error;

use super::Instruction;
use crate::config::SolidConfig;

/// Magic bytes identifying a Solid module image
pub const MAGIC: &[u8; 4] = b"SLDB";

/// Current image format version
pub const VERSION: u32 = 1;

const HEADER_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinaryError {
    /// Not a Solid module image
    #[error("invalid magic bytes, not a Solid module")]
    InvalidMagic,
    #[error("unsupported image version: {0} (current: {current})", current = VERSION)]
    UnsupportedVersion(u32),
    /// Fewer bytes than the header announces
    #[error("truncated image: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("failed to serialize: {0}")]
    Serialize(String),
    #[error("failed to deserialize: {0}")]
    Deserialize(String),
}

/// Options the image was compiled with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageFlags {
    pub constant_folding: bool,
    pub int_coercion: bool,
}

impl ImageFlags {
    pub fn to_u32(self) -> u32 {
        let mut flags: u32 = 0;
        if self.constant_folding {
            flags |= 1 << 0;
        }
        if self.int_coercion {
            flags |= 1 << 1;
        }
        flags
    }

    pub fn from_u32(value: u32) -> Self {
        Self {
            constant_folding: (value & (1 << 0)) != 0,
            int_coercion: (value & (1 << 1)) != 0,
        }
    }
}

impl From<&SolidConfig> for ImageFlags {
    fn from(config: &SolidConfig) -> Self {
        Self {
            constant_folding: config.compiler_options.constant_folding,
            int_coercion: config.compiler_options.int_coercion,
        }
    }
}

/// A decoded image
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleImage {
    pub version: u32,
    pub flags: ImageFlags,
    pub module: Instruction,
}

pub fn encode(module: &Instruction, flags: ImageFlags) -> Result<Vec<u8>, BinaryError> {
    let payload = bincode::serialize(module).map_err(|e| BinaryError::Serialize(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .map_err(|_| BinaryError::Serialize("payload exceeds 4 GiB".to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&flags.to_u32().to_le_bytes());
    bytes.extend_from_slice(&length.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

pub fn decode(data: &[u8]) -> Result<ModuleImage, BinaryError> {
    if data.len() < 4 || &data[0..4] != MAGIC {
        return Err(BinaryError::InvalidMagic);
    }
    if data.len() < HEADER_LEN {
        return Err(BinaryError::Truncated {
            expected: HEADER_LEN,
            actual: data.len(),
        });
    }

    let version = read_u32(data, 4);
    if version > VERSION {
        return Err(BinaryError::UnsupportedVersion(version));
    }
    let flags = ImageFlags::from_u32(read_u32(data, 8));
    let length = read_u32(data, 12) as usize;

    let expected = HEADER_LEN + length;
    if data.len() < expected {
        return Err(BinaryError::Truncated {
            expected,
            actual: data.len(),
        });
    }

    let module: Instruction = bincode::deserialize(&data[HEADER_LEN..expected])
        .map_err(|e| BinaryError::Deserialize(e.to_string()))?;

    Ok(ModuleImage {
        version,
        flags,
        module,
    })
}
