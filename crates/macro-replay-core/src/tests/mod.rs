mod fakes;
mod timeline;
