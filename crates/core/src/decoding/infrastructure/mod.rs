pub mod rqrr_decoder;
