pub mod curves;
pub mod delay_line;
pub mod drywet;
pub mod filter;
pub mod oversample;
pub mod shaper;
