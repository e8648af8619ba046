pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod quad;
    pub mod scan_event;
}

pub mod capture {
    pub mod domain {
        pub mod frame_source;
    }
    pub mod infrastructure;
}

pub mod decoding {
    pub mod domain {
        pub mod code_decoder;
    }
    pub mod infrastructure;
}

pub mod lookup {
    pub mod domain {
        pub mod lookup_service;
    }
    pub mod infrastructure;
}

pub mod presentation {
    pub mod domain {
        pub mod presentation_sink;
    }
    pub mod infrastructure;
}

pub mod scanning {
    pub mod frame_clock;
    pub mod history_log;
    pub mod lookup_dispatcher;
    pub mod scan_config;
    pub mod scan_controller;
    pub mod scan_logger;
    pub mod suppression_store;
}
