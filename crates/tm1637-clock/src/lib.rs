#![no_std]

pub mod flash;
pub mod port;
