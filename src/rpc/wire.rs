//! Length-prefixed JSON framing (§6A).
//!
//! Each frame is a 4-byte little-endian length prefix followed by that many
//! bytes of UTF-8 JSON — the same header-then-body shape the teacher's own
//! wire protocol uses, simplified from a fixed 16-byte binary header plus BSON
//! body down to a single length word plus JSON body.

use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame body this side will accept, guarding against a corrupt or
/// malicious length prefix turning into an unbounded allocation.
const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

pub async fn write_message<W, T>(writer: &mut W, message: &T) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message).map_err(to_io_error)?;
    let mut framed = Vec::with_capacity(4 + body.len());
    WriteBytesExt::write_u32::<LittleEndian>(&mut framed, body.len() as u32)?;
    framed.extend_from_slice(&body);
    writer.write_all(&framed).await?;
    writer.flush().await
}

pub async fn read_message<R, T>(reader: &mut R) -> io::Result<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = Cursor::new(len_buf).read_u32::<LittleEndian>()?;
    if len > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds {MAX_FRAME_BYTES} byte limit"),
        ));
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    serde_json::from_slice(&body).map_err(to_io_error)
}

fn to_io_error(e: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::message::{RpcRequest, RpcResponse};

    #[tokio::test]
    async fn request_round_trips_over_a_duplex_pipe() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        let request = RpcRequest::Initialize {
            tx_id: "tx1".into(),
        };
        write_message(&mut client, &request).await.unwrap();
        let received: RpcRequest = read_message(&mut server).await.unwrap();
        match received {
            RpcRequest::Initialize { tx_id } => assert_eq!(tx_id, "tx1"),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[tokio::test]
    async fn response_round_trips_over_a_duplex_pipe() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        let response = RpcResponse::Vote { yes: true };
        write_message(&mut server, &response).await.unwrap();
        let received: RpcResponse = read_message(&mut client).await.unwrap();
        assert!(received.is_yes_vote());
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        WriteBytesExt::write_u32::<LittleEndian>(&mut Vec::new(), 0).unwrap();
        let mut framed = Vec::new();
        WriteBytesExt::write_u32::<LittleEndian>(&mut framed, MAX_FRAME_BYTES + 1).unwrap();
        client.write_all(&framed).await.unwrap();
        let result: io::Result<RpcRequest> = read_message(&mut server).await;
        assert!(result.is_err());
    }
}
