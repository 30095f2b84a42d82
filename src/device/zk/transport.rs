//! Socket plumbing for the terminal protocol.
//!
//! The same packets travel over both transports. TCP wraps each packet in an
//! 8-byte frame (magic `50 50 82 7d` + little-endian length); UDP sends the
//! bare packet per datagram. All timeouts come from the device config.

use crate::device::DeviceConfig;
use crate::errors::{AppError, AppResult};
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs, UdpSocket};

const TCP_MAGIC: [u8; 4] = [0x50, 0x50, 0x82, 0x7D];

/// Datagrams are small; chunked table reads cap the payload well below this.
const UDP_RECV_BUF: usize = 16 * 1024;

pub enum Transport {
    Tcp(TcpStream),
    Udp(UdpSocket),
}

impl Transport {
    pub fn open(cfg: &DeviceConfig) -> AppResult<Self> {
        if cfg.force_udp {
            Self::open_udp(cfg)
        } else {
            Self::open_tcp(cfg)
        }
    }

    fn open_tcp(cfg: &DeviceConfig) -> AppResult<Self> {
        let addr = cfg
            .addr()
            .to_socket_addrs()
            .map_err(|e| AppError::Connection(format!("cannot resolve {}: {}", cfg.addr(), e)))?
            .next()
            .ok_or_else(|| AppError::Connection(format!("cannot resolve {}", cfg.addr())))?;

        let stream = TcpStream::connect_timeout(&addr, cfg.timeout())
            .map_err(|e| AppError::Connection(format!("{} unreachable: {}", cfg.addr(), e)))?;
        stream
            .set_read_timeout(Some(cfg.timeout()))
            .and_then(|_| stream.set_write_timeout(Some(cfg.timeout())))
            .map_err(|e| AppError::Connection(format!("socket setup failed: {e}")))?;

        Ok(Transport::Tcp(stream))
    }

    fn open_udp(cfg: &DeviceConfig) -> AppResult<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| AppError::Connection(format!("UDP bind failed: {e}")))?;
        socket
            .set_read_timeout(Some(cfg.timeout()))
            .and_then(|_| socket.set_write_timeout(Some(cfg.timeout())))
            .map_err(|e| AppError::Connection(format!("socket setup failed: {e}")))?;
        socket
            .connect(cfg.addr())
            .map_err(|e| AppError::Connection(format!("{} unreachable: {}", cfg.addr(), e)))?;

        Ok(Transport::Udp(socket))
    }

    /// Largest chunk worth requesting per buffered read.
    pub fn max_chunk(&self) -> u32 {
        match self {
            Transport::Tcp(_) => 0xFFC0,
            Transport::Udp(_) => 16 * 1024 - 8,
        }
    }

    /// Send one protocol packet.
    pub fn send(&mut self, packet: &[u8]) -> AppResult<()> {
        match self {
            Transport::Tcp(stream) => {
                let mut frame = Vec::with_capacity(8 + packet.len());
                frame.extend_from_slice(&TCP_MAGIC);
                frame.extend_from_slice(&(packet.len() as u32).to_le_bytes());
                frame.extend_from_slice(packet);
                stream
                    .write_all(&frame)
                    .map_err(|e| AppError::Connection(format!("send failed: {e}")))
            }
            Transport::Udp(socket) => {
                socket
                    .send(packet)
                    .map_err(|e| AppError::Connection(format!("send failed: {e}")))?;
                Ok(())
            }
        }
    }

    /// Receive one protocol packet.
    pub fn recv(&mut self) -> AppResult<Vec<u8>> {
        match self {
            Transport::Tcp(stream) => {
                let mut header = [0u8; 8];
                stream
                    .read_exact(&mut header)
                    .map_err(|e| AppError::Connection(format!("receive failed: {e}")))?;
                if header[0..4] != TCP_MAGIC {
                    return Err(AppError::Connection(
                        "malformed frame header from device".to_string(),
                    ));
                }
                let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
                let mut body = vec![0u8; len];
                stream
                    .read_exact(&mut body)
                    .map_err(|e| AppError::Connection(format!("receive failed: {e}")))?;
                Ok(body)
            }
            Transport::Udp(socket) => {
                let mut buf = vec![0u8; UDP_RECV_BUF];
                let n = socket
                    .recv(&mut buf)
                    .map_err(|e| AppError::Connection(format!("receive failed: {e}")))?;
                buf.truncate(n);
                Ok(buf)
            }
        }
    }
}
