#![allow(dead_code)]

#[cfg(unix)]
pub mod decoder;
pub mod env;
pub mod pcm;
