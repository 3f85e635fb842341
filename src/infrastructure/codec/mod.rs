mod frame_decoder;
mod frame_stream;

pub use frame_decoder::FrameDecoder;
pub use frame_stream::decode_frames;
