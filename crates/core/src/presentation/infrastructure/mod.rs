pub mod log_presentation_sink;
