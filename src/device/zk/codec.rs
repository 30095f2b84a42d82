//! Packet and record codecs for the ZKTeco commodity protocol.
//!
//! Every packet is an 8-byte header (command, checksum, session id, reply id,
//! all little-endian u16) followed by a command-specific payload. The
//! checksum is a 16-bit ones'-complement sum over the packet with the
//! checksum field zeroed.

use crate::device::{RawPunch, RawUser};
use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime};

// Command codes
pub const CMD_CONNECT: u16 = 1000;
pub const CMD_EXIT: u16 = 1001;
pub const CMD_ENABLEDEVICE: u16 = 1002;
pub const CMD_DISABLEDEVICE: u16 = 1003;
pub const CMD_GET_VERSION: u16 = 1100;
pub const CMD_AUTH: u16 = 1102;
pub const CMD_OPTIONS_RRQ: u16 = 11;
pub const CMD_USERTEMP_RRQ: u16 = 9;
pub const CMD_ATTLOG_RRQ: u16 = 13;

pub const CMD_PREPARE_DATA: u16 = 1500;
pub const CMD_DATA: u16 = 1501;
pub const CMD_FREE_DATA: u16 = 1502;
pub const CMD_DATA_WRRQ: u16 = 1503;
pub const CMD_READ_BUFFER: u16 = 1504;

// Reply codes
pub const CMD_ACK_OK: u16 = 2000;
pub const CMD_ACK_ERROR: u16 = 2001;
pub const CMD_ACK_UNAUTH: u16 = 2005;

/// Read-with-buffer sub-function selector for the user table.
pub const FCT_USER: u16 = 5;

const USHRT_MAX: u32 = 65535;

/// 16-bit ones'-complement checksum, little-endian words, odd trailing byte
/// added as-is.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = data.chunks_exact(2);
    for c in &mut chunks {
        sum += u32::from(u16::from_le_bytes([c[0], c[1]]));
        if sum > USHRT_MAX {
            sum -= USHRT_MAX;
        }
    }
    if let [b] = chunks.remainder() {
        sum += u32::from(*b);
    }
    while sum > USHRT_MAX {
        sum -= USHRT_MAX;
    }
    (!sum & 0xFFFF) as u16
}

/// Assemble a full packet: header with valid checksum plus payload.
pub fn build_packet(command: u16, session_id: u16, reply_id: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + payload.len());
    buf.extend_from_slice(&command.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&session_id.to_le_bytes());
    buf.extend_from_slice(&reply_id.to_le_bytes());
    buf.extend_from_slice(payload);

    let ck = checksum(&buf);
    buf[2..4].copy_from_slice(&ck.to_le_bytes());
    buf
}

/// A parsed reply packet.
#[derive(Debug, Clone)]
pub struct Reply {
    pub command: u16,
    pub session_id: u16,
    pub reply_id: u16,
    pub payload: Vec<u8>,
}

pub fn parse_packet(data: &[u8]) -> AppResult<Reply> {
    if data.len() < 8 {
        return Err(AppError::Connection(format!(
            "short reply from device ({} bytes)",
            data.len()
        )));
    }
    Ok(Reply {
        command: u16::from_le_bytes([data[0], data[1]]),
        session_id: u16::from_le_bytes([data[4], data[5]]),
        reply_id: u16::from_le_bytes([data[6], data[7]]),
        payload: data[8..].to_vec(),
    })
}

/// Derive the 4-byte comm key sent with CMD_AUTH from the device password and
/// the session id handed out by CMD_CONNECT.
pub fn make_commkey(password: u32, session_id: u16) -> [u8; 4] {
    // Bit-reverse the password, add the session id.
    let mut k: u32 = 0;
    for i in 0..32 {
        k <<= 1;
        if password & (1 << i) != 0 {
            k |= 1;
        }
    }
    k = k.wrapping_add(u32::from(session_id));

    let b = k.to_le_bytes();
    let x = [b[0] ^ b'Z', b[1] ^ b'K', b[2] ^ b'S', b[3] ^ b'O'];

    // Swap the two 16-bit halves, then fold in the fixed tick byte.
    let swapped = [x[2], x[3], x[0], x[1]];
    let t = 50u8;
    [swapped[0] ^ t, swapped[1] ^ t, t, swapped[3] ^ t]
}

/// Decode the packed calendar format used in attendance records.
pub fn decode_time(mut t: u32) -> Option<NaiveDateTime> {
    let second = t % 60;
    t /= 60;
    let minute = t % 60;
    t /= 60;
    let hour = t % 24;
    t /= 24;
    let day = t % 31 + 1;
    t /= 31;
    let month = t % 12 + 1;
    t /= 12;
    let year = (t + 2000) as i32;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Payload sent with CMD_DATA_WRRQ to request a buffered table read.
pub fn read_buffer_request(command: u16, fct: u16) -> Vec<u8> {
    let mut p = Vec::with_capacity(11);
    p.push(1u8);
    p.extend_from_slice(&command.to_le_bytes());
    p.extend_from_slice(&u32::from(fct).to_le_bytes());
    p.extend_from_slice(&0u32.to_le_bytes());
    p
}

/// Payload sent with CMD_READ_BUFFER for one chunk.
pub fn read_chunk_request(start: u32, size: u32) -> Vec<u8> {
    let mut p = Vec::with_capacity(8);
    p.extend_from_slice(&start.to_le_bytes());
    p.extend_from_slice(&size.to_le_bytes());
    p
}

fn cstr(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let s = String::from_utf8_lossy(&bytes[..end]).trim().to_string();
    if s.is_empty() { None } else { Some(s) }
}

fn strip_size_prefix(data: &[u8]) -> AppResult<&[u8]> {
    if data.len() < 4 {
        return Err(AppError::Connection(
            "device table read returned a truncated buffer".to_string(),
        ));
    }
    Ok(&data[4..])
}

/// Parse the user-table buffer. Firmware generations use 72- or 28-byte
/// records; the record size is recovered from divisibility.
pub fn parse_roster(data: &[u8]) -> AppResult<Vec<RawUser>> {
    let body = strip_size_prefix(data)?;
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let record = if body.len() % 72 == 0 {
        72
    } else if body.len() % 28 == 0 {
        28
    } else {
        return Err(AppError::Connection(format!(
            "unrecognized user record layout ({} bytes)",
            body.len()
        )));
    };

    let mut out = Vec::with_capacity(body.len() / record);
    for rec in body.chunks_exact(record) {
        let uid = u16::from_le_bytes([rec[0], rec[1]]);
        let (name, user_id) = if record == 72 {
            // uid u16, privilege u8, password [8], name [24], card u32,
            // group u8, pad, timezones [6], pad, user id text [24]
            let name = cstr(&rec[11..35]);
            let id_text = cstr(&rec[48..72]);
            let user_id = id_text
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or(i64::from(uid));
            (name, user_id)
        } else {
            // uid u16, privilege u8, password [5], name [8], card u32, pad,
            // group u8, timezone u16, user id u32
            let name = cstr(&rec[8..16]);
            let user_id = i64::from(u32::from_le_bytes([rec[24], rec[25], rec[26], rec[27]]));
            let user_id = if user_id != 0 { user_id } else { i64::from(uid) };
            (name, user_id)
        };

        out.push(RawUser { user_id, name });
    }

    Ok(out)
}

/// Parse the attendance-log buffer. Record layouts of 40, 16 and 8 bytes are
/// in the field depending on firmware.
pub fn parse_attendance(data: &[u8]) -> AppResult<Vec<RawPunch>> {
    let body = strip_size_prefix(data)?;
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let record = if body.len() % 40 == 0 {
        40
    } else if body.len() % 16 == 0 {
        16
    } else if body.len() % 8 == 0 {
        8
    } else {
        return Err(AppError::Connection(format!(
            "unrecognized attendance record layout ({} bytes)",
            body.len()
        )));
    };

    let mut out = Vec::with_capacity(body.len() / record);
    for rec in body.chunks_exact(record) {
        let (user_id, raw_time, verify, punch) = match record {
            40 => {
                // uid u16, user id text [24], verify u8, time u32, punch u8, pad [8]
                let uid = u16::from_le_bytes([rec[0], rec[1]]);
                let user_id = cstr(&rec[2..26])
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or(i64::from(uid));
                let verify = rec[26];
                let raw_time = u32::from_le_bytes([rec[27], rec[28], rec[29], rec[30]]);
                (user_id, raw_time, verify, rec[31])
            }
            16 => {
                // user id u32, time u32, verify u8, punch u8, pad [2], workcode u32
                let user_id = i64::from(u32::from_le_bytes([rec[0], rec[1], rec[2], rec[3]]));
                let raw_time = u32::from_le_bytes([rec[4], rec[5], rec[6], rec[7]]);
                (user_id, raw_time, rec[8], rec[9])
            }
            _ => {
                // uid u16, verify u8, time u32, punch u8
                let user_id = i64::from(u16::from_le_bytes([rec[0], rec[1]]));
                let raw_time = u32::from_le_bytes([rec[3], rec[4], rec[5], rec[6]]);
                (user_id, raw_time, rec[2], rec[7])
            }
        };

        // Records with an undecodable time slot are dropped rather than
        // failing the whole log, mirroring how the original tolerated
        // timestamp-less entries.
        if let Some(timestamp) = decode_time(raw_time) {
            out.push(RawPunch {
                user_id,
                timestamp,
                punch_type: i64::from(punch),
                verify_method: i64::from(verify),
            });
        }
    }

    Ok(out)
}
