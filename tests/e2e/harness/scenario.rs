use super::assertions::{Assertion, CustomCheck, ErrorMatch};
use super::recording::StoreOp;
use super::runner::ScenarioRunner;
use super::steps::{DraftEdit, ScenarioStep};
use recipe_core::RecipeRecord;
use std::collections::HashMap;
use std::time::Duration;

/// Fluent DSL for building test scenarios
pub struct Scenario {
    name: String,
    fixture: Option<String>,
    initial_files: HashMap<String, Vec<u8>>,
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Create a new scenario with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fixture: None,
            initial_files: HashMap::new(),
            steps: Vec::new(),
        }
    }

    // ===== Initial setup =====

    /// Add a single file to the initial store
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.initial_files
            .insert(path.to_string(), content.to_vec());
        self
    }

    /// Start from a directory under tests/fixtures
    pub fn from_fixture(mut self, fixture_name: &str) -> Self {
        self.fixture = Some(fixture_name.to_string());
        self
    }

    // ===== Form actions =====

    /// Switch the form to new-record mode
    pub fn new_mode(mut self) -> Self {
        self.steps.push(ScenarioStep::EnterNewMode);
        self
    }

    /// Load a stored recipe into the form
    pub fn load(mut self, category: &str, file: &str) -> Self {
        self.steps.push(ScenarioStep::Load {
            category: category.to_string(),
            file: file.to_string(),
        });
        self
    }

    /// Submit a record as typed into the form
    pub fn save(mut self, record: RecipeRecord) -> Self {
        self.steps.push(ScenarioStep::SaveNew {
            record,
            image: None,
        });
        self
    }

    /// Submit a record with an image upload
    pub fn save_with_image(mut self, record: RecipeRecord, image: Vec<u8>) -> Self {
        self.steps.push(ScenarioStep::SaveNew {
            record,
            image: Some(image),
        });
        self
    }

    /// Change the loaded draft and submit it
    pub fn edit_and_save(
        mut self,
        edit: impl Fn(&mut RecipeRecord) + Send + Sync + 'static,
    ) -> Self {
        self.steps.push(ScenarioStep::SaveDraft {
            edit: DraftEdit(Box::new(edit)),
            image: None,
        });
        self
    }

    /// Change the loaded draft and submit it with an image upload
    pub fn edit_and_save_with_image(
        mut self,
        edit: impl Fn(&mut RecipeRecord) + Send + Sync + 'static,
        image: Vec<u8>,
    ) -> Self {
        self.steps.push(ScenarioStep::SaveDraft {
            edit: DraftEdit(Box::new(edit)),
            image: Some(image),
        });
        self
    }

    /// Submit the loaded draft unchanged
    pub fn resave(self) -> Self {
        self.edit_and_save(|_| {})
    }

    /// Delete the loaded recipe
    pub fn delete(mut self, confirmed: bool) -> Self {
        self.steps.push(ScenarioStep::Delete { confirmed });
        self
    }

    /// The previous step must fail with `error`
    pub fn fails_with(mut self, error: ErrorMatch) -> Self {
        let step = self
            .steps
            .pop()
            .unwrap_or_else(|| panic!("fails_with() needs a preceding step"));
        self.steps.push(ScenarioStep::ExpectError {
            step: Box::new(step),
            error,
        });
        self
    }

    // ===== Outside world =====

    /// Someone else writes a file directly
    pub fn external_write(mut self, path: &str, content: &[u8]) -> Self {
        self.steps.push(ScenarioStep::ExternalWrite {
            path: path.to_string(),
            content: content.to_vec(),
        });
        self
    }

    /// Someone else removes a file directly
    pub fn external_delete(mut self, path: &str) -> Self {
        self.steps.push(ScenarioStep::ExternalDelete {
            path: path.to_string(),
        });
        self
    }

    // ===== Failure simulation =====

    /// The next store call of `op` fails as unreachable
    pub fn store_fails_next(mut self, op: StoreOp) -> Self {
        self.steps.push(ScenarioStep::StoreFailsNext { op });
        self
    }

    /// Forget store calls recorded so far
    pub fn clear_call_log(mut self) -> Self {
        self.steps.push(ScenarioStep::ClearCallLog);
        self
    }

    /// Replace the session with a new one over the same store
    pub fn restart(mut self) -> Self {
        self.steps.push(ScenarioStep::Restart);
        self
    }

    // ===== Time control =====

    /// Wait for a duration
    pub fn wait(mut self, duration: Duration) -> Self {
        self.steps.push(ScenarioStep::Wait { duration });
        self
    }

    // ===== Assertions =====

    /// Add a general assertion
    pub fn assert(mut self, assertion: Assertion) -> Self {
        self.steps.push(ScenarioStep::Assert { assertion });
        self
    }

    /// Assert with a custom check
    pub fn assert_that(self, check: CustomCheck) -> Self {
        self.assert(Assertion::Custom(check))
    }

    /// Assert the session has nothing bound
    pub fn assert_fresh(self) -> Self {
        self.assert(Assertion::Fresh)
    }

    /// Assert the session is bound to `location`
    pub fn assert_loaded_at(self, location: &str) -> Self {
        self.assert(Assertion::LoadedAt {
            location: location.to_string(),
        })
    }

    /// Assert the draft title
    pub fn assert_draft_title(self, title: &str) -> Self {
        self.assert(Assertion::DraftTitle(title.to_string()))
    }

    /// Assert the draft is cleared
    pub fn assert_draft_empty(self) -> Self {
        self.assert(Assertion::DraftEmpty)
    }

    /// Assert a store file exists
    pub fn assert_file_exists(self, path: &str) -> Self {
        self.assert(Assertion::FileExists {
            path: path.to_string(),
        })
    }

    /// Assert a store file is absent
    pub fn assert_file_missing(self, path: &str) -> Self {
        self.assert(Assertion::FileMissing {
            path: path.to_string(),
        })
    }

    /// Assert a store file contains text
    pub fn assert_file_contains(self, path: &str, content: &str) -> Self {
        self.assert(Assertion::FileContentContains {
            path: path.to_string(),
            content: content.to_string(),
        })
    }

    /// Assert the full text of a store file
    pub fn assert_file_content(self, path: &str, content: &str) -> Self {
        self.assert(Assertion::FileContent {
            path: path.to_string(),
            content: content.to_string(),
        })
    }

    /// Assert how many calls of one kind were made
    pub fn assert_calls(self, op: StoreOp, count: usize) -> Self {
        self.assert(Assertion::CallCount { op, count })
    }

    /// Assert the exact call log, e.g. `["create docs/main/Curry.md"]`
    pub fn assert_call_sequence(self, calls: &[&str]) -> Self {
        self.assert(Assertion::CallSequence(
            calls.iter().map(|c| c.to_string()).collect(),
        ))
    }

    /// Assert no store call was made
    pub fn assert_no_store_calls(self) -> Self {
        self.assert(Assertion::NoStoreCalls)
    }

    /// Assert the message of the latest mutating call
    pub fn assert_last_message(self, message: &str) -> Self {
        self.assert(Assertion::LastMessage(message.to_string()))
    }

    /// Assert the category listing
    pub fn assert_categories(self, categories: &[&str]) -> Self {
        self.assert(Assertion::Categories(
            categories.iter().map(|c| c.to_string()).collect(),
        ))
    }

    /// Assert the image stored by the last successful save
    pub fn assert_image_uploaded(self, path: &str) -> Self {
        self.assert(Assertion::ImageUploaded {
            path: path.to_string(),
        })
    }

    // ===== Execution =====

    /// Execute the scenario and return results
    pub fn run(self) -> ScenarioResult {
        let mut runner =
            match ScenarioRunner::new(self.fixture.as_deref(), self.initial_files.clone()) {
                Ok(r) => r,
                Err(e) => {
                    return ScenarioResult {
                        name: self.name.clone(),
                        success: false,
                        steps_executed: 0,
                        failure_step: Some(0),
                        error: Some(format!("Failed to create runner: {}", e)),
                    }
                }
            };

        match runner.execute(&self.steps) {
            Ok(()) => ScenarioResult {
                name: self.name,
                success: true,
                steps_executed: self.steps.len(),
                failure_step: None,
                error: None,
            },
            Err(e) => {
                let failure_step = runner.current_step();
                ScenarioResult {
                    name: self.name,
                    success: false,
                    steps_executed: failure_step,
                    failure_step: Some(failure_step),
                    error: Some(format!("{:?}", e)),
                }
            }
        }
    }
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub steps_executed: usize,
    pub failure_step: Option<usize>,
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Unwrap the result, panicking if it failed
    pub fn unwrap(self) {
        if !self.success {
            panic!(
                "Scenario '{}' failed at step {}: {}",
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }

    /// Expect the result to be successful
    pub fn expect(self, msg: &str) {
        if !self.success {
            panic!(
                "{}: Scenario '{}' failed at step {}: {}",
                msg,
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }
}
