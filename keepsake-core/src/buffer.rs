// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Primitive codec: little-endian fixed-width numbers, varints and raw bytes.
//!
//! The [`Writer`] never fails. Every [`Reader`] method is bounds-checked and
//! reports a truncated stream as [`Error::BufferOutOfBound`] carrying the
//! offending offset.

use crate::error::Error;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

#[derive(Default, Debug)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Writer {
        Writer {
            bf: Vec::with_capacity(capacity),
        }
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.bf.reserve(additional);
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        self.bf.extend_from_slice(v);
        v.len()
    }

    // Writes into a Vec<u8> cannot fail, the `Result` from byteorder is always `Ok`.

    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.bf.push(value as u8);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bf.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        let _ = self.bf.write_u16::<LittleEndian>(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        let _ = self.bf.write_i16::<LittleEndian>(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        let _ = self.bf.write_u32::<LittleEndian>(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        let _ = self.bf.write_i32::<LittleEndian>(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        let _ = self.bf.write_u64::<LittleEndian>(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        let _ = self.bf.write_i64::<LittleEndian>(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        let _ = self.bf.write_f32::<LittleEndian>(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        let _ = self.bf.write_f64::<LittleEndian>(value);
    }

    pub fn write_varint32(&mut self, value: i32) {
        let zigzag = ((value << 1) ^ (value >> 31)) as u32;
        self.write_varuint32(zigzag)
    }

    pub fn write_varuint32(&mut self, value: u32) {
        self.write_varuint64(value as u64)
    }

    pub fn write_varint64(&mut self, value: i64) {
        let zigzag = ((value << 1) ^ (value >> 63)) as u64;
        self.write_varuint64(zigzag)
    }

    pub fn write_varuint64(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.bf.push(((value as u8) & 0x7F) | 0x80);
            value >>= 7;
        }
        self.bf.push(value as u8);
    }

    /// Writes a varuint32 byte length followed by the UTF-8 bytes of `s`.
    pub fn write_utf8_string(&mut self, s: &str) {
        self.write_varuint32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }
}

#[derive(Debug, Clone)]
pub struct Reader<'bf> {
    bf: &'bf [u8],
    cursor: usize,
}

impl<'bf> Reader<'bf> {
    pub fn new(bf: &'bf [u8]) -> Reader<'bf> {
        Reader { bf, cursor: 0 }
    }

    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    #[inline(always)]
    fn check_bound(&self, n: usize) -> Result<(), Error> {
        if self.cursor + n > self.bf.len() {
            return Err(Error::buffer_out_of_bound(self.cursor, n, self.bf.len()));
        }
        Ok(())
    }

    #[inline(always)]
    fn take(&mut self, n: usize) -> Result<&'bf [u8], Error> {
        self.check_bound(n)?;
        let s = &self.bf[self.cursor..self.cursor + n];
        self.cursor += n;
        Ok(s)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    /// Returns the next byte as `i8` without consuming it.
    pub fn peek_i8(&self) -> Result<i8, Error> {
        self.check_bound(1)?;
        Ok(self.bf[self.cursor] as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::invalid_data(format!(
                "invalid bool byte {} at offset {}",
                other,
                self.cursor - 1
            ))),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, Error> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    pub fn read_varuint32(&mut self) -> Result<u32, Error> {
        let start = self.cursor;
        let value = self.read_varuint64()?;
        if value > u32::MAX as u64 {
            return Err(Error::invalid_data(format!(
                "varuint32 at offset {} overflows: {}",
                start, value
            )));
        }
        Ok(value as u32)
    }

    pub fn read_varint32(&mut self) -> Result<i32, Error> {
        let encoded = self.read_varuint32()?;
        Ok(((encoded >> 1) as i32) ^ -((encoded & 1) as i32))
    }

    pub fn read_varuint64(&mut self) -> Result<u64, Error> {
        let start = self.cursor;
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let b = self.read_u8()?;
            if shift == 63 && b > 1 {
                return Err(Error::invalid_data(format!(
                    "varuint64 at offset {} overflows",
                    start
                )));
            }
            result |= ((b & 0x7F) as u64) << shift;
            if b & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 63 {
                return Err(Error::invalid_data(format!(
                    "varuint64 at offset {} is longer than 10 bytes",
                    start
                )));
            }
        }
    }

    pub fn read_varint64(&mut self) -> Result<i64, Error> {
        let encoded = self.read_varuint64()?;
        Ok(((encoded >> 1) as i64) ^ -((encoded & 1) as i64))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'bf [u8], Error> {
        self.take(len)
    }

    /// Reads a varuint32 byte length followed by that many UTF-8 bytes.
    pub fn read_utf8_string(&mut self) -> Result<String, Error> {
        let len = self.read_varuint32()? as usize;
        let start = self.cursor;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| Error::invalid_data(format!("invalid utf-8 at offset {}: {}", start, e)))
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.take(len).map(|_| ())
    }
}
