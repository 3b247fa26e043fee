mod codec;
mod compactor;
