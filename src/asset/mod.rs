// Fetching and decoding glTF models off the render thread

pub mod decode;
pub mod draco;
pub mod loader;
pub mod progress;
pub mod source;

pub use decode::{LoadedAsset, build_asset, decode_slice, parse, resolve_buffers};
pub use draco::{DecodedGeometry, DracoLayout, MeshDecoder, default_decoder};
pub use loader::{AssetLoader, LoadEvent, LoadHandle, LoadReporter, channel, load_asset};
pub use progress::{LoadProgress, ProgressTracker};
pub use source::{ByteSource, LoadRequest, Location, fetch, read_to_end};
