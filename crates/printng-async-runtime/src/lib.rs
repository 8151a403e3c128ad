pub mod logger;
pub mod worker;

// Re-export types from the library crate
pub use printng::{
    FailureStage, MapState, OptionKey, PrintOptionsPatch, PrintRequest, Template, TemplateId,
};

pub use logger::{LogEntry, PrintLogger};
pub use worker::worker_task;

/// Commands sent from the host to the print worker
#[derive(Debug)]
pub enum PrintCommand {
    SetOptions {
        patch: PrintOptionsPatch,
    },
    /// Use a built-in paper size, by name
    SelectPaper {
        name: String,
    },
    LoadTemplates,
    SetActiveTemplate {
        id: TemplateId,
    },
    /// Replace the map the worker prints
    SetMap {
        map: MapState,
    },
    Preview {
        request: PrintRequest,
    },
    Print {
        request: PrintRequest,
    },
    /// Deliver the last preview
    Commit,
}

impl PrintCommand {
    /// Commands that start or finish a print job
    pub fn is_print(&self) -> bool {
        matches!(
            self,
            PrintCommand::Preview { .. } | PrintCommand::Print { .. } | PrintCommand::Commit
        )
    }
}

/// Updates sent from the print worker to the host
#[derive(Debug, Clone)]
pub enum PrintUpdate {
    TemplatesLoaded {
        templates: Vec<Template>,
        active: Option<TemplateId>,
    },
    OptionsChanged {
        keys: Vec<OptionKey>,
    },
    Previewed {
        url: String,
    },
    Delivered {
        url: String,
    },
    /// A download listener took over delivery of `url`
    DownloadVetoed {
        url: String,
    },
    Cancelled,
    /// Command refused, e.g. a second print while one is in flight
    Rejected {
        reason: String,
    },
    Error {
        stage: Option<FailureStage>,
        message: String,
    },
}
