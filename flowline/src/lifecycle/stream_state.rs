//! Lifecycle flag model and the explicit destroy phase machine.

use crate::stream_error::SharedError;

/// Capability shape of a stream, fixed at construction.
///
/// Selecting the shape up front (instead of probing for side state at
/// runtime) means every flag access is checked against the stream's declared
/// capabilities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StreamKind {
    /// Produces data; has only read-side state.
    Readable,
    /// Consumes data; has only write-side state.
    Writable,
    /// Both sides, one conceptual error.
    Duplex,
}

/// Destroy progress as a named state machine.
///
/// Re-entrant `destroy()` calls made from inside the teardown hook observe
/// `Destroying` (and `destroyed == true`) and take the already-destroyed
/// branch, which is what makes self-referential teardown logic safe.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum DestroyPhase {
    Idle,
    Destroying,
    TornDown,
}

/// Per-side lifecycle flags.
#[derive(Debug, Default)]
pub(crate) struct SideState {
    pub(crate) ended: bool,
    pub(crate) errored: Option<SharedError>,
    pub(crate) error_emitted: bool,
}

/// Side storage selected by [`StreamKind`].
#[derive(Debug)]
pub(crate) enum SideStates {
    Readable { read: SideState },
    Writable { write: SideState },
    Duplex { read: SideState, write: SideState },
}

impl SideStates {
    fn for_kind(kind: StreamKind) -> Self {
        match kind {
            StreamKind::Readable => SideStates::Readable {
                read: SideState::default(),
            },
            StreamKind::Writable => SideStates::Writable {
                write: SideState::default(),
            },
            StreamKind::Duplex => SideStates::Duplex {
                read: SideState::default(),
                write: SideState::default(),
            },
        }
    }
}

/// Lifecycle flags owned exclusively by one stream.
#[derive(Debug)]
pub(crate) struct StreamState {
    pub(crate) kind: StreamKind,
    pub(crate) sides: SideStates,
    pub(crate) phase: DestroyPhase,
    /// Monotonic: once true, never false again (except via `undestroy`).
    pub(crate) destroyed: bool,
    /// Teardown completed.
    pub(crate) closed: bool,
    /// A close notification was dispatched.
    pub(crate) close_emitted: bool,
    /// Configuration: whether a close notification should ever fire.
    pub(crate) emit_close: bool,
    /// Configuration: whether errors automatically trigger destroy.
    pub(crate) auto_destroy: bool,
    /// Configuration: raw OS-handle sinks are never auto-ended by a pipe.
    pub(crate) raw_sink: bool,
}

impl StreamState {
    pub(crate) fn new(
        kind: StreamKind,
        emit_close: bool,
        auto_destroy: bool,
        raw_sink: bool,
    ) -> Self {
        Self {
            kind,
            sides: SideStates::for_kind(kind),
            phase: DestroyPhase::Idle,
            destroyed: false,
            closed: false,
            close_emitted: false,
            emit_close,
            auto_destroy,
            raw_sink,
        }
    }

    pub(crate) fn read_side(&self) -> Option<&SideState> {
        match &self.sides {
            SideStates::Readable { read } => Some(read),
            SideStates::Duplex { read, .. } => Some(read),
            SideStates::Writable { .. } => None,
        }
    }

    pub(crate) fn read_side_mut(&mut self) -> Option<&mut SideState> {
        match &mut self.sides {
            SideStates::Readable { read } => Some(read),
            SideStates::Duplex { read, .. } => Some(read),
            SideStates::Writable { .. } => None,
        }
    }

    pub(crate) fn write_side(&self) -> Option<&SideState> {
        match &self.sides {
            SideStates::Writable { write } => Some(write),
            SideStates::Duplex { write, .. } => Some(write),
            SideStates::Readable { .. } => None,
        }
    }

    pub(crate) fn write_side_mut(&mut self) -> Option<&mut SideState> {
        match &mut self.sides {
            SideStates::Writable { write } => Some(write),
            SideStates::Duplex { write, .. } => Some(write),
            SideStates::Readable { .. } => None,
        }
    }

    /// Returns the terminal error, write side first for duplex streams.
    pub(crate) fn errored(&self) -> Option<SharedError> {
        self.write_side()
            .and_then(|side| side.errored.clone())
            .or_else(|| self.read_side().and_then(|side| side.errored.clone()))
    }

    /// Records the terminal error on the write side when one exists,
    /// otherwise on the read side. The first recorded error wins; later
    /// errors are dropped to keep `errored` immutable once set.
    pub(crate) fn record_error(&mut self, error: &SharedError) {
        if self.errored().is_some() {
            return;
        }

        let side = match self.kind {
            StreamKind::Readable => self.read_side_mut(),
            StreamKind::Writable | StreamKind::Duplex => self.write_side_mut(),
        };
        if let Some(side) = side {
            side.errored = Some(error.clone());
        }
    }

    /// True when an error notification was dispatched on either side.
    pub(crate) fn error_emitted(&self) -> bool {
        self.read_side().is_some_and(|side| side.error_emitted)
            || self.write_side().is_some_and(|side| side.error_emitted)
    }

    /// Marks every present side as having emitted: a duplex stream has two
    /// sides but one conceptual error.
    pub(crate) fn mark_error_emitted(&mut self) {
        if let Some(side) = self.read_side_mut() {
            side.error_emitted = true;
        }
        if let Some(side) = self.write_side_mut() {
            side.error_emitted = true;
        }
    }

    pub(crate) fn read_ended(&self) -> bool {
        self.read_side().is_some_and(|side| side.ended)
    }

    pub(crate) fn write_ended(&self) -> bool {
        self.write_side().is_some_and(|side| side.ended)
    }

    /// Transitions `Idle` to `Destroying`. Returns `false` when destroy has
    /// already begun, in which case no flag changes.
    pub(crate) fn begin_destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }

        self.destroyed = true;
        self.phase = DestroyPhase::Destroying;
        true
    }

    /// Transitions `Destroying` to `TornDown` once teardown has finished.
    pub(crate) fn finish_teardown(&mut self) {
        self.phase = DestroyPhase::TornDown;
        self.closed = true;
    }

    /// Resets every flag to its initial value, keeping configuration.
    ///
    /// Precondition (documented, not enforced): must not be called while an
    /// asynchronous teardown is in flight.
    pub(crate) fn undestroy(&mut self) {
        self.sides = SideStates::for_kind(self.kind);
        self.phase = DestroyPhase::Idle;
        self.destroyed = false;
        self.closed = false;
        self.close_emitted = false;
    }
}
