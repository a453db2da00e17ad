//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zift.
//! The Zift project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Zift Archive Module
//!
//! Binary persistence for transformers.
//!
//! ## Encoding
//!
//! - Fixed-width integers and floats are written little-endian.
//! - `bool` is a single byte, `0` or `1`.
//! - Strings are a `u32` byte length followed by UTF-8 bytes.
//! - `Vec<T>` and maps are a `u32` element count followed by the elements;
//!   map entries are written key first, then value.
//! - `Option<T>` is a presence flag followed by the value when present.
//!
//! Every persisted transformer starts with a `u16` major and a `u16` minor
//! version, see [`write_version`] and [`read_version`].
//!
//! ## Usage
//!
//! ```rust
//! use zift::archive::{ZiArchivable, ZiCArchive, ZiCArchiveReader};
//!
//! let mut archive = ZiCArchive::new();
//! "label".to_string().write_to(&mut archive);
//! 7u32.write_to(&mut archive);
//!
//! let bytes = archive.into_bytes();
//! let mut reader = ZiCArchiveReader::new(&bytes);
//! assert_eq!(String::read_from(&mut reader).unwrap(), "label");
//! assert_eq!(u32::read_from(&mut reader).unwrap(), 7);
//! ```

use std::collections::BTreeMap;

use crate::errors::{Result, ZiError};

/// Major version written by every transformer in this build.
pub const ZI_ARCHIVE_MAJOR_VERSION: u16 = 1;
/// Minor version written by every transformer in this build.
pub const ZI_ARCHIVE_MINOR_VERSION: u16 = 0;

/// Append-only archive writer.
///
/// A container too large for its `u32` length prefix is recorded rather than
/// truncated; [`ZiCArchive::check`] reports it.
#[derive(Clone, Debug, Default)]
pub struct ZiCArchive {
    buffer: Vec<u8>,
    oversized: Option<usize>,
}

impl ZiCArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails when a container length did not fit its prefix.
    pub fn check(&self) -> Result<()> {
        match self.oversized {
            Some(len) => Err(ZiError::invalid_argument(format!(
                "container of {len} elements exceeds the u32 length prefix"
            ))),
            None => Ok(()),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Left-to-right reader over a borrowed byte buffer.
#[derive(Clone, Debug)]
pub struct ZiCArchiveReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ZiCArchiveReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Consumes exactly `len` bytes or fails without advancing.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(ZiError::corrupt_archive(format!(
                "requested {len} bytes at offset {} but only {remaining} remain",
                self.offset
            )));
        }

        let bytes = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails when unread bytes are left in the buffer.
    pub fn finish(&self) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(ZiError::corrupt_archive(format!(
                "{} trailing bytes after payload",
                self.remaining()
            )))
        }
    }
}

/// Types with a defined archive encoding.
pub trait ZiArchivable: Sized {
    fn write_to(&self, archive: &mut ZiCArchive);

    fn read_from(reader: &mut ZiCArchiveReader<'_>) -> Result<Self>;
}

macro_rules! impl_archivable_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ZiArchivable for $ty {
                fn write_to(&self, archive: &mut ZiCArchive) {
                    archive.write_bytes(&self.to_le_bytes());
                }

                fn read_from(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
                    Ok(<$ty>::from_le_bytes(reader.read_array()?))
                }
            }
        )*
    };
}

impl_archivable_le!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl ZiArchivable for bool {
    fn write_to(&self, archive: &mut ZiCArchive) {
        archive.write_bytes(&[u8::from(*self)]);
    }

    fn read_from(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        match u8::read_from(reader)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ZiError::corrupt_archive(format!("invalid bool byte {other}"))),
        }
    }
}

/// Writes a container length as a `u32` prefix.
pub(crate) fn write_len(archive: &mut ZiCArchive, len: usize) {
    match u32::try_from(len) {
        Ok(len) => len.write_to(archive),
        Err(_) => {
            archive.oversized.get_or_insert(len);
            u32::MAX.write_to(archive);
        }
    }
}

fn read_len(reader: &mut ZiCArchiveReader<'_>) -> Result<usize> {
    Ok(u32::read_from(reader)? as usize)
}

impl ZiArchivable for String {
    fn write_to(&self, archive: &mut ZiCArchive) {
        write_len(archive, self.len());
        archive.write_bytes(self.as_bytes());
    }

    fn read_from(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        let len = read_len(reader)?;
        let bytes = reader.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|err| ZiError::corrupt_archive(format!("invalid UTF-8 string: {err}")))
    }
}

impl<T: ZiArchivable> ZiArchivable for Vec<T> {
    fn write_to(&self, archive: &mut ZiCArchive) {
        write_len(archive, self.len());
        for item in self {
            item.write_to(archive);
        }
    }

    fn read_from(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        let len = read_len(reader)?;
        // A corrupt count must not drive a huge allocation.
        let mut items = Vec::with_capacity(len.min(reader.remaining()));
        for _ in 0..len {
            items.push(T::read_from(reader)?);
        }
        Ok(items)
    }
}

impl<T: ZiArchivable> ZiArchivable for Option<T> {
    fn write_to(&self, archive: &mut ZiCArchive) {
        match self {
            Some(value) => {
                true.write_to(archive);
                value.write_to(archive);
            }
            None => false.write_to(archive),
        }
    }

    fn read_from(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        if bool::read_from(reader)? {
            Ok(Some(T::read_from(reader)?))
        } else {
            Ok(None)
        }
    }
}

impl<K: ZiArchivable + Ord, V: ZiArchivable> ZiArchivable for BTreeMap<K, V> {
    fn write_to(&self, archive: &mut ZiCArchive) {
        write_len(archive, self.len());
        for (key, value) in self {
            key.write_to(archive);
            value.write_to(archive);
        }
    }

    fn read_from(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        let len = read_len(reader)?;
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = K::read_from(reader)?;
            let value = V::read_from(reader)?;
            if map.insert(key, value).is_some() {
                return Err(ZiError::corrupt_archive("duplicate map key"));
            }
        }
        Ok(map)
    }
}

impl<A: ZiArchivable, B: ZiArchivable> ZiArchivable for (A, B) {
    fn write_to(&self, archive: &mut ZiCArchive) {
        self.0.write_to(archive);
        self.1.write_to(archive);
    }

    fn read_from(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        let first = A::read_from(reader)?;
        let second = B::read_from(reader)?;
        Ok((first, second))
    }
}

/// Writes the current major and minor version.
pub fn write_version(archive: &mut ZiCArchive) {
    ZI_ARCHIVE_MAJOR_VERSION.write_to(archive);
    ZI_ARCHIVE_MINOR_VERSION.write_to(archive);
}

/// Reads the version header and rejects anything other than the current one.
pub fn read_version(reader: &mut ZiCArchiveReader<'_>) -> Result<()> {
    let major = u16::read_from(reader)?;
    let minor = u16::read_from(reader)?;
    if major != ZI_ARCHIVE_MAJOR_VERSION || minor != ZI_ARCHIVE_MINOR_VERSION {
        return Err(ZiError::version_mismatch(major, minor));
    }
    Ok(())
}
