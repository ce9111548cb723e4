pub mod buffer;
pub mod constants;
pub mod error;
pub mod fft_engine;
pub mod processor;
pub mod spectrum;
pub mod spectrum_analyzer;
pub mod window_functions;
