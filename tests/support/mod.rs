#![allow(dead_code)]

use std::cell::RefCell;

use livepreview::{FragmentRenderer, RenderError};

/// Deterministic renderer that records every fragment it is asked for.
#[derive(Default)]
pub struct CountingRenderer {
    calls: RefCell<Vec<String>>,
    failing: Vec<&'static str>,
}

impl CountingRenderer {
    /// Fail any fragment containing one of `needles`.
    pub fn failing_on(needles: &[&'static str]) -> Self {
        Self {
            calls: RefCell::default(),
            failing: needles.to_vec(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl FragmentRenderer for CountingRenderer {
    fn render_fragment(&self, markup: &str) -> Result<String, RenderError> {
        self.calls.borrow_mut().push(markup.to_owned());
        if self.failing.iter().any(|needle| markup.contains(needle)) {
            return Err(RenderError::markdown(format!("cannot render {markup:?}")));
        }
        Ok(format!("<section>{}</section>", markup.trim()))
    }
}
