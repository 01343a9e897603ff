use std::sync::{Arc, Mutex};

use tapsuite::{Hooks, Status};

/// One hook invocation as seen by [`EventRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Start {
        test: String,
        repeat_index: usize,
        retry_index: usize,
        status: Option<Status>,
    },
    End {
        test: String,
        repeat_index: usize,
        retry_index: usize,
        status: Status,
    },
}

/// Hooks that record every test start/end and capture printed output
/// instead of writing to stdout.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<Recorded>>>,
    printed: Arc<Mutex<String>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks that record, keep the default suite hooks and print into the
    /// recorder.
    pub fn hooks(&self) -> Hooks {
        let starts = Arc::clone(&self.events);
        let ends = Arc::clone(&self.events);
        let printed = Arc::clone(&self.printed);

        Hooks::default()
            .on_test_start(move |_, event| {
                starts.lock().unwrap().push(Recorded::Start {
                    test: event.test.name.clone(),
                    repeat_index: event.repeat_index,
                    retry_index: event.retry_index,
                    status: event.status,
                });
                Ok(())
            })
            .on_test_end(move |settings, event| {
                ends.lock().unwrap().push(Recorded::End {
                    test: event.test.name.clone(),
                    repeat_index: event.repeat_index,
                    retry_index: event.retry_index,
                    status: event.result.status,
                });
                (settings.print)(&event.report);
                Ok(())
            })
            .print(move |text| printed.lock().unwrap().push_str(text))
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    /// Terminal statuses in the order attempts ended.
    pub fn end_statuses(&self) -> Vec<(String, Status)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Recorded::End { test, status, .. } => Some((test, status)),
                Recorded::Start { .. } => None,
            })
            .collect()
    }

    /// Everything printed through the `print` hook.
    pub fn printed(&self) -> String {
        self.printed.lock().unwrap().clone()
    }
}
