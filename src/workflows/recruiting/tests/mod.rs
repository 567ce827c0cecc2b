mod common;
mod interviews;
