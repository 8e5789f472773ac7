#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// Pack a JSON document and a binary blob into a GLB container.
pub fn glb(document: &Value, bin: &[u8]) -> Vec<u8> {
    let mut json = serde_json::to_vec(document).unwrap();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + if bin.is_empty() { 0 } else { 8 + bin.len() };
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json);
    if !bin.is_empty() {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(&bin);
    }
    out
}

fn push_f32s(bin: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        bin.extend_from_slice(&v.to_le_bytes());
    }
}

/// One triangle under a "Spinner" node (child of "Root") and two one-second
/// clips on it: "Spin" rotates, "Lift" translates.
pub fn animated_glb() -> Vec<u8> {
    let mut bin = Vec::new();
    // 0: positions
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // 36: indices, padded to 44
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin.extend_from_slice(&[0, 0]);
    // 44: key times
    push_f32s(&mut bin, &[0.0, 1.0]);
    // 52: rotations, identity then a half turn about Y
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
    // 84: translations
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
    assert_eq!(bin.len(), 108);

    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Root", "children": [1] },
            { "name": "Spinner", "mesh": 0, "translation": [0.0, 1.0, 0.0] }
        ],
        "meshes": [{
            "name": "Triangle",
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }]
        }],
        "materials": [{
            "pbrMetallicRoughness": {
                "baseColorFactor": [0.8, 0.2, 0.2, 1.0],
                "metallicFactor": 0.0,
                "roughnessFactor": 0.5
            }
        }],
        "animations": [
            {
                "name": "Spin",
                "channels": [{ "sampler": 0, "target": { "node": 1, "path": "rotation" } }],
                "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }]
            },
            {
                "name": "Lift",
                "channels": [{ "sampler": 0, "target": { "node": 1, "path": "translation" } }],
                "samplers": [{ "input": 2, "output": 4, "interpolation": "LINEAR" }]
            }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [1.0] },
            { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC4" },
            { "bufferView": 4, "componentType": 5126, "count": 2, "type": "VEC3" }
        ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 },
            { "buffer": 0, "byteOffset": 44, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 52, "byteLength": 32 },
            { "buffer": 0, "byteOffset": 84, "byteLength": 24 }
        ],
        "buffers": [{ "byteLength": 108 }]
    });
    glb(&document, &bin)
}

/// A single Draco-compressed triangle. The payload is opaque, so only a
/// substitute decoder can make sense of it.
pub fn draco_glb() -> Vec<u8> {
    let bin = [0xD5u8, 0xAC, 0x00, 0x01];
    let document = json!({
        "asset": { "version": "2.0" },
        "extensionsUsed": ["KHR_draco_mesh_compression"],
        "nodes": [{ "name": "Compressed", "mesh": 0 }],
        "meshes": [{
            "name": "Packed",
            "primitives": [{
                "attributes": { "POSITION": 0 },
                "indices": 1,
                "extensions": {
                    "KHR_draco_mesh_compression": {
                        "bufferView": 0,
                        "attributes": { "POSITION": 0 }
                    }
                }
            }]
        }],
        "accessors": [
            { "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 4 }],
        "buffers": [{ "byteLength": 4 }]
    });
    glb(&document, &bin)
}

/// Write `bytes` to a file in the temp dir that is unique to this test process.
pub fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("glbvis-{}-{name}", std::process::id()));
    std::fs::write(&path, bytes).unwrap();
    path
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `Content-Length` header, body written in small pieces.
    Length,
    /// Chunked transfer encoding, so the total is unknown to the client.
    Chunked,
}

/// Serve one request from a local listener and return the URL to fetch.
pub async fn serve_once(status: u16, body: Vec<u8>, framing: Framing) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let reason = if status == 200 { "OK" } else { "Error" };
        let mut head = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: model/gltf-binary\r\nConnection: close\r\n"
        );
        match framing {
            Framing::Length => head.push_str(&format!("Content-Length: {}\r\n\r\n", body.len())),
            Framing::Chunked => head.push_str("Transfer-Encoding: chunked\r\n\r\n"),
        }
        stream.write_all(head.as_bytes()).await.unwrap();

        for piece in body.chunks(32) {
            match framing {
                Framing::Length => stream.write_all(piece).await.unwrap(),
                Framing::Chunked => {
                    stream
                        .write_all(format!("{:x}\r\n", piece.len()).as_bytes())
                        .await
                        .unwrap();
                    stream.write_all(piece).await.unwrap();
                    stream.write_all(b"\r\n").await.unwrap();
                }
            }
            stream.flush().await.unwrap();
        }
        if framing == Framing::Chunked {
            stream.write_all(b"0\r\n\r\n").await.unwrap();
        }
        let _ = stream.shutdown().await;
    });

    format!("http://{addr}/models/animated.glb")
}
