pub mod input_buffer;
pub mod risk_chart;
