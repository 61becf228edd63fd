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

use crate::error::Error;
use crate::resolver::context::ReadContext;
use crate::resolver::context::WriteContext;
use crate::serializer::Serializer;
use crate::util::EPOCH;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Microseconds since the Unix epoch, read as UTC.
impl Serializer for NaiveDateTime {
    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context
            .writer
            .write_varint64(self.and_utc().timestamp_micros());
        Ok(())
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        let micros = context.reader.read_varint64()?;
        DateTime::from_timestamp_micros(micros)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| {
                Error::invalid_data(format!("timestamp {}us is out of range", micros))
            })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Days since the Unix epoch.
impl Serializer for NaiveDate {
    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        let days_since_epoch = self.signed_duration_since(EPOCH).num_days();
        let days = i32::try_from(days_since_epoch)
            .map_err(|_| Error::invalid_data(format!("date {} is out of range", self)))?;
        context.writer.write_varint32(days);
        Ok(())
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        let days = context.reader.read_varint32()?;
        EPOCH
            .checked_add_signed(chrono::TimeDelta::days(days as i64))
            .ok_or_else(|| {
                Error::invalid_data(format!("date {} days from epoch is out of range", days))
            })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
