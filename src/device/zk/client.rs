//! Session handling for ZKTeco terminals.
//!
//! Each adapter call opens its own session and tears it down on every exit
//! path, successful or not — the firmware only grants a few concurrent
//! sessions and a leaked one blocks the terminal until it times out.

use super::codec::{
    self, CMD_ACK_OK, CMD_ACK_UNAUTH, CMD_ATTLOG_RRQ, CMD_AUTH, CMD_CONNECT, CMD_DATA,
    CMD_DATA_WRRQ, CMD_DISABLEDEVICE, CMD_ENABLEDEVICE, CMD_EXIT, CMD_FREE_DATA, CMD_GET_VERSION,
    CMD_OPTIONS_RRQ, CMD_PREPARE_DATA, CMD_READ_BUFFER, CMD_USERTEMP_RRQ, FCT_USER, Reply,
};
use super::transport::Transport;
use crate::device::{DeviceClient, DeviceConfig, DeviceInfo, RawPunch, RawUser};
use crate::errors::{AppError, AppResult};

struct Session {
    transport: Transport,
    session_id: u16,
    reply_id: u16,
}

impl Session {
    fn open(cfg: &DeviceConfig) -> AppResult<Self> {
        let transport = Transport::open(cfg)?;
        let mut session = Session {
            transport,
            session_id: 0,
            reply_id: 0,
        };

        let reply = session.command(CMD_CONNECT, &[])?;
        session.session_id = reply.session_id;

        match reply.command {
            CMD_ACK_OK => Ok(session),
            CMD_ACK_UNAUTH => {
                let key = codec::make_commkey(cfg.password, session.session_id);
                let auth = session.command(CMD_AUTH, &key)?;
                if auth.command == CMD_ACK_OK {
                    Ok(session)
                } else {
                    Err(AppError::Connection(
                        "authentication rejected, check the device password".to_string(),
                    ))
                }
            }
            other => Err(AppError::Connection(format!(
                "connect refused by device (code {other})"
            ))),
        }
    }

    /// Send one command and read its reply.
    ///
    /// Replies are matched by reply id: a buffered read that ends exactly on
    /// a chunk boundary can leave its closing ACK in the socket, and that
    /// stale packet must not be taken for the answer to the next command.
    fn command(&mut self, cmd: u16, payload: &[u8]) -> AppResult<Reply> {
        self.reply_id = self.reply_id.wrapping_add(1);
        let packet = codec::build_packet(cmd, self.session_id, self.reply_id, payload);
        self.transport.send(&packet)?;

        for _ in 0..4 {
            let reply = codec::parse_packet(&self.transport.recv()?)?;
            if reply.reply_id == self.reply_id {
                return Ok(reply);
            }
        }
        Err(AppError::Connection(
            "no matching reply from device".to_string(),
        ))
    }

    /// Send a command that must be acknowledged with CMD_ACK_OK.
    fn command_ok(&mut self, cmd: u16, payload: &[u8]) -> AppResult<Reply> {
        let reply = self.command(cmd, payload)?;
        if reply.command != CMD_ACK_OK {
            return Err(AppError::Connection(format!(
                "device rejected command {cmd} (code {})",
                reply.command
            )));
        }
        Ok(reply)
    }

    /// Read one device option ("key=value") by name.
    fn read_option(&mut self, key: &str) -> AppResult<String> {
        let mut payload = key.as_bytes().to_vec();
        payload.push(0);
        let reply = self.command_ok(CMD_OPTIONS_RRQ, &payload)?;

        let text = String::from_utf8_lossy(&reply.payload);
        let text = text.trim_end_matches('\0');
        match text.split_once('=') {
            Some((_, value)) => Ok(value.trim().to_string()),
            None => Err(AppError::Connection(format!(
                "malformed option reply for {key}"
            ))),
        }
    }

    /// Buffered table read: the device announces a total size, then hands the
    /// buffer out in chunks of CMD_DATA packets.
    fn read_table(&mut self, table_cmd: u16, fct: u16) -> AppResult<Vec<u8>> {
        let request = codec::read_buffer_request(table_cmd, fct);
        let reply = self.command(CMD_DATA_WRRQ, &request)?;

        match reply.command {
            // Small tables arrive inline.
            CMD_DATA => Ok(reply.payload),
            CMD_PREPARE_DATA => self.collect_data(&reply),
            CMD_ACK_OK => {
                if reply.payload.len() < 5 {
                    return Err(AppError::Connection(
                        "truncated buffer announcement from device".to_string(),
                    ));
                }
                let total = u32::from_le_bytes([
                    reply.payload[1],
                    reply.payload[2],
                    reply.payload[3],
                    reply.payload[4],
                ]);

                let max_chunk = self.transport.max_chunk();
                let mut data = Vec::with_capacity(total as usize);
                let mut start = 0u32;
                while start < total {
                    let size = max_chunk.min(total - start);
                    data.extend(self.read_chunk(start, size)?);
                    start += size;
                }

                // Release the device-side buffer; a failure here only leaks
                // until the session closes.
                let _ = self.command(CMD_FREE_DATA, &[]);
                Ok(data)
            }
            other => Err(AppError::Connection(format!(
                "unexpected reply to table read (code {other})"
            ))),
        }
    }

    fn read_chunk(&mut self, start: u32, size: u32) -> AppResult<Vec<u8>> {
        let reply = self.command(CMD_READ_BUFFER, &codec::read_chunk_request(start, size))?;
        match reply.command {
            CMD_DATA => Ok(reply.payload),
            CMD_PREPARE_DATA => self.collect_data(&reply),
            other => Err(AppError::Connection(format!(
                "unexpected reply to chunk read (code {other})"
            ))),
        }
    }

    /// After CMD_PREPARE_DATA announces a size, CMD_DATA packets follow until
    /// the announced amount arrived, closed by an ACK.
    fn collect_data(&mut self, prepare: &Reply) -> AppResult<Vec<u8>> {
        if prepare.payload.len() < 4 {
            return Err(AppError::Connection(
                "truncated data announcement from device".to_string(),
            ));
        }
        let expected = u32::from_le_bytes([
            prepare.payload[0],
            prepare.payload[1],
            prepare.payload[2],
            prepare.payload[3],
        ]) as usize;

        let mut data = Vec::with_capacity(expected);
        while data.len() < expected {
            let part = codec::parse_packet(&self.transport.recv()?)?;
            match part.command {
                CMD_DATA => data.extend(part.payload),
                CMD_ACK_OK => break,
                other => {
                    return Err(AppError::Connection(format!(
                        "unexpected packet in data stream (code {other})"
                    )));
                }
            }
        }

        if data.len() < expected {
            return Err(AppError::Connection(format!(
                "device closed the data stream early ({} of {expected} bytes)",
                data.len()
            )));
        }

        // Trailing ACK after a complete stream, if the device sends one, is
        // consumed by the next command's reply handling on UDP and by the
        // framed read on TCP.
        data.truncate(expected);
        Ok(data)
    }

    /// Best-effort session teardown.
    fn close(mut self) {
        let _ = self.command(CMD_EXIT, &[]);
    }
}

/// The real terminal adapter. Stateless: every call runs its own session.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZkClient;

impl ZkClient {
    pub fn new() -> Self {
        ZkClient
    }

    fn with_session<T>(
        &self,
        cfg: &DeviceConfig,
        f: impl FnOnce(&mut Session) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut session = Session::open(cfg)?;
        let result = f(&mut session);
        session.close();
        result
    }

    /// Read a whole table with the device disabled, re-enabling it before the
    /// session closes even when the read fails.
    fn read_table_quiesced(&self, cfg: &DeviceConfig, cmd: u16, fct: u16) -> AppResult<Vec<u8>> {
        self.with_session(cfg, |session| {
            session.command_ok(CMD_DISABLEDEVICE, &[])?;
            let data = session.read_table(cmd, fct);
            let _ = session.command_ok(CMD_ENABLEDEVICE, &[]);
            data
        })
    }
}

impl DeviceClient for ZkClient {
    fn probe(&self, cfg: &DeviceConfig) -> AppResult<DeviceInfo> {
        self.with_session(cfg, |session| {
            let version = session.command_ok(CMD_GET_VERSION, &[])?;
            let firmware = String::from_utf8_lossy(&version.payload)
                .trim_end_matches('\0')
                .trim()
                .to_string();
            let serial = session.read_option("~SerialNumber")?;
            Ok(DeviceInfo { firmware, serial })
        })
    }

    fn fetch_roster(&self, cfg: &DeviceConfig) -> AppResult<Vec<RawUser>> {
        let data = self.read_table_quiesced(cfg, CMD_USERTEMP_RRQ, FCT_USER)?;
        codec::parse_roster(&data)
    }

    fn fetch_punches(&self, cfg: &DeviceConfig) -> AppResult<Vec<RawPunch>> {
        let data = self.read_table_quiesced(cfg, CMD_ATTLOG_RRQ, 0)?;
        codec::parse_attendance(&data)
    }
}
