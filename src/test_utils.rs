pub mod test_helpers {
    use crate::input::{Event, KeyCode, SimulatedEventSource};

    /// Builder for scripted user input in app-level tests.
    pub struct ScriptBuilder {
        events: Vec<Event>,
    }

    impl ScriptBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        pub fn press(mut self, code: KeyCode) -> Self {
            self.events.push(SimulatedEventSource::key_event(code));
            self
        }

        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        /// Advance n times.
        pub fn forward(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('j'));
            }
            self
        }

        /// Go back n times.
        pub fn backward(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('k'));
            }
            self
        }

        pub fn resize(mut self, width: u16, height: u16) -> Self {
            self.events.push(SimulatedEventSource::resize(width, height));
            self
        }

        /// End the script with a quit so the run loop terminates.
        pub fn quit(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.press_char('q').events)
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    impl Default for ScriptBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
