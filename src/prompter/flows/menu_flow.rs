use crate::core::context::AppContext;
use crate::core::models::{ActivityDraft, RelationshipDraft};
use crate::core::types::MenuChoice;
use crate::errors::{Error, Result};
use crate::logging::LogTarget;
use crate::prompter::models::{Flow, FlowCtrl};
use crate::scope::ledger::ChangeLedger;
use crate::ui::chrome::UiChrome;
use crate::ui::display_manager::DisplayManager;
use strum::IntoEnumIterator;

enum MenuState {
    Menu,
    AddActivityName,
    AddActivityDescription {
        name: String,
    },
    AddActivityDuration {
        name: String,
        description: String,
    },
    DeleteActivity,
    AddRelationshipPredecessor,
    AddRelationshipSuccessor {
        predecessor: String,
    },
    AddRelationshipType {
        predecessor: String,
        successor: String,
    },
    AddRelationshipLag {
        predecessor: String,
        successor: String,
        relation: String,
    },
    DeleteRelationship,
    DissolveActivity,
    Prompt,
    ConfirmChanges {
        ledger: ChangeLedger,
    },
}

/// The top-level interactive flow: a numbered menu with short
/// field-collection detours for each operation.
pub struct MenuFlow<'a> {
    ctx: &'a mut AppContext,
    state: MenuState,
    chrome: UiChrome,
    display: DisplayManager,
}

impl<'a> MenuFlow<'a> {
    pub fn new(ctx: &'a mut AppContext) -> Self {
        Self {
            ctx,
            state: MenuState::Menu,
            chrome: UiChrome::new(),
            display: DisplayManager::new(),
        }
    }

    fn render_menu(&mut self) {
        if !self.ctx.startup_displayed {
            self.chrome.clear_screen();
            self.chrome.print_banner();
            self.ctx.startup_displayed = true;
        }
        println!();
        println!("Main Menu");
        for (i, choice) in MenuChoice::iter().enumerate() {
            println!("  {}. {}", i + 1, choice.label());
        }
        println!("Enter a number (or type \"exit\" to quit):");
    }

    /// Report an operation failure and fall back to the menu.
    fn fail(&mut self, err: Error) -> Result<FlowCtrl> {
        self.ctx
            .logger
            .error(format!("{err}"), LogTarget::ConsoleAndFile);
        self.state = MenuState::Menu;
        Ok(FlowCtrl::Continue)
    }

    fn handle_menu_choice(&mut self, input: &str) -> Result<FlowCtrl> {
        let choice = match MenuChoice::try_from(input) {
            Ok(c) => c,
            Err(err) => return self.fail(err),
        };
        match choice {
            MenuChoice::AddActivity => self.state = MenuState::AddActivityName,
            MenuChoice::DeleteActivity => self.state = MenuState::DeleteActivity,
            MenuChoice::AddRelationship => self.state = MenuState::AddRelationshipPredecessor,
            MenuChoice::DeleteRelationship => self.state = MenuState::DeleteRelationship,
            MenuChoice::DissolveActivity => self.state = MenuState::DissolveActivity,
            MenuChoice::OpenPrompt => self.state = MenuState::Prompt,
            MenuChoice::RunSchedule => {
                self.run_schedule();
                self.state = MenuState::Menu;
            }
            MenuChoice::Quit => return Ok(FlowCtrl::Finish),
        }
        Ok(FlowCtrl::Continue)
    }

    fn run_schedule(&mut self) {
        // Another session may have written to the graph store since startup.
        let rt = self.ctx.runtime();
        if let Err(err) = rt.block_on(self.ctx.schedule.refresh()) {
            self.ctx.logger.warn(
                format!("Could not reload the schedule ({err}); showing the cached copy."),
                LogTarget::ConsoleAndFile,
            );
        }
        self.display.show_activities(&self.ctx.schedule);
        self.display.show_relationships(&self.ctx.schedule);
        match self.ctx.schedule.critical_path() {
            Ok(cp) => self.display.show_critical_path(&self.ctx.schedule, &cp),
            Err(err) => self
                .ctx
                .logger
                .error(format!("{err}"), LogTarget::ConsoleAndFile),
        }
    }

    fn finish_add_activity(
        &mut self,
        name: String,
        description: String,
        input: &str,
    ) -> Result<FlowCtrl> {
        let duration = match parse_days(input) {
            Ok(d) => d,
            Err(err) => return self.fail(err),
        };
        let rt = self.ctx.runtime();
        match rt.block_on(self.ctx.schedule.add_activity(ActivityDraft {
            name,
            description,
            duration,
        })) {
            Ok(activity) => {
                self.ctx.logger.info(
                    format!("Added activity '{}' ({} days).", activity.name, activity.duration),
                    LogTarget::ConsoleAndFile,
                );
                self.state = MenuState::Menu;
                Ok(FlowCtrl::Continue)
            }
            Err(err) => self.fail(err),
        }
    }

    fn finish_delete_activity(&mut self, input: &str) -> Result<FlowCtrl> {
        let id = match self.resolve_activity(input) {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        let rt = self.ctx.runtime();
        match rt.block_on(self.ctx.schedule.remove_activity(id)) {
            Ok((activity, dropped)) => {
                self.ctx.logger.info(
                    format!(
                        "Deleted activity '{}' and {} attached relationships.",
                        activity.name,
                        dropped.len()
                    ),
                    LogTarget::ConsoleAndFile,
                );
                self.state = MenuState::Menu;
                Ok(FlowCtrl::Continue)
            }
            Err(err) => self.fail(err),
        }
    }

    fn finish_add_relationship(
        &mut self,
        predecessor: String,
        successor: String,
        relation: String,
        input: &str,
    ) -> Result<FlowCtrl> {
        let lag = if input.trim().is_empty() {
            0.0
        } else {
            match parse_days(input) {
                Ok(l) => l,
                Err(err) => return self.fail(err),
            }
        };
        let (pred_id, succ_id) = match (
            self.resolve_activity(&predecessor),
            self.resolve_activity(&successor),
        ) {
            (Ok(p), Ok(s)) => (p, s),
            (Err(err), _) | (_, Err(err)) => return self.fail(err),
        };
        let rt = self.ctx.runtime();
        match rt.block_on(self.ctx.schedule.add_relationship(RelationshipDraft {
            predecessor: pred_id,
            successor: succ_id,
            relation,
            lag,
        })) {
            Ok(relationship) => {
                self.ctx.logger.info(
                    format!(
                        "Added {} relationship '{}' -> '{}' (lag {} days).",
                        relationship.relation, predecessor, successor, relationship.lag
                    ),
                    LogTarget::ConsoleAndFile,
                );
                self.state = MenuState::Menu;
                Ok(FlowCtrl::Continue)
            }
            Err(err) => self.fail(err),
        }
    }

    fn finish_delete_relationship(&mut self, input: &str) -> Result<FlowCtrl> {
        let index: usize = match input.trim().parse() {
            Ok(i) => i,
            Err(_) => {
                return self.fail(Error::parse(format!(
                    "Invalid selection: '{}'. Enter the # of a relationship.",
                    input.trim()
                )));
            }
        };
        let id = {
            let relationships = self.ctx.schedule.relationships();
            match index.checked_sub(1).and_then(|i| relationships.get(i)) {
                Some(r) => r.id,
                None => {
                    return self.fail(Error::RelationshipNotFound(format!("#{index}")));
                }
            }
        };
        let rt = self.ctx.runtime();
        match rt.block_on(self.ctx.schedule.remove_relationship(id)) {
            Ok(relationship) => {
                self.ctx.logger.info(
                    format!("Deleted {relationship}."),
                    LogTarget::ConsoleAndFile,
                );
                self.state = MenuState::Menu;
                Ok(FlowCtrl::Continue)
            }
            Err(err) => self.fail(err),
        }
    }

    fn finish_dissolve(&mut self, input: &str) -> Result<FlowCtrl> {
        let id = match self.resolve_activity(input) {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        let rt = self.ctx.runtime();
        match rt.block_on(self.ctx.schedule.dissolve_activity(id)) {
            Ok(outcome) => {
                self.ctx.logger.info(
                    format!(
                        "Dissolved '{}': removed {} relationships, created {} bridges.",
                        outcome.removed.name,
                        outcome.dropped.len(),
                        outcome.created.len()
                    ),
                    LogTarget::ConsoleAndFile,
                );
                self.state = MenuState::Menu;
                Ok(FlowCtrl::Continue)
            }
            Err(err) => self.fail(err),
        }
    }

    fn handle_prompt(&mut self, input: &str) -> Result<FlowCtrl> {
        if input.trim().is_empty() {
            self.state = MenuState::Menu;
            return Ok(FlowCtrl::Continue);
        }
        let rt = self.ctx.runtime();
        match rt.block_on(self.ctx.scope.dispatch(&mut self.ctx.schedule, input)) {
            Ok(ledger) if ledger.is_empty() => {
                // Nothing to change: treat it as a question about the schedule.
                match rt.block_on(self.ctx.scope.read_scope(&self.ctx.schedule, input)) {
                    Ok(answer) => {
                        self.ctx.logger.info(answer, LogTarget::ConsoleAndFile);
                        self.state = MenuState::Menu;
                        Ok(FlowCtrl::Continue)
                    }
                    Err(err) => self.fail(err),
                }
            }
            Ok(ledger) => {
                self.display.show_change_summary(&ledger);
                self.state = MenuState::ConfirmChanges { ledger };
                Ok(FlowCtrl::Continue)
            }
            Err(err) => self.fail(err),
        }
    }

    fn handle_confirm(&mut self, ledger: ChangeLedger, input: &str) -> Result<FlowCtrl> {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => {
                self.ctx.logger.info(
                    format!("Accepted {} changes.", ledger.len()),
                    LogTarget::ConsoleAndFile,
                );
                self.state = MenuState::Menu;
                Ok(FlowCtrl::Continue)
            }
            "n" | "no" => {
                let rt = self.ctx.runtime();
                match rt.block_on(ledger.undo(&mut self.ctx.schedule)) {
                    Ok(()) => {
                        self.ctx
                            .logger
                            .info("Changes rolled back.", LogTarget::ConsoleAndFile);
                        self.state = MenuState::Menu;
                        Ok(FlowCtrl::Continue)
                    }
                    Err(err) => self.fail(err),
                }
            }
            _ => {
                // Keep asking until we get a clear answer.
                self.state = MenuState::ConfirmChanges { ledger };
                Ok(FlowCtrl::Continue)
            }
        }
    }

    fn resolve_activity(&self, name: &str) -> Result<uuid::Uuid> {
        self.ctx
            .schedule
            .find_activity_by_name(name)
            .map(|a| a.id)
            .ok_or_else(|| Error::ActivityNotFound(name.trim().to_string()))
    }
}

fn parse_days(input: &str) -> Result<f64> {
    let value: f64 = input.trim().parse().map_err(|_| {
        Error::parse(format!(
            "Invalid number of days: '{}'.",
            input.trim()
        ))
    })?;
    if !value.is_finite() {
        return Err(Error::parse(format!("Invalid number of days: '{value}'.")));
    }
    Ok(value)
}

impl Flow for MenuFlow<'_> {
    fn render(&mut self) -> Result<()> {
        match &self.state {
            MenuState::Menu => self.render_menu(),
            MenuState::AddActivityName => println!("Activity name:"),
            MenuState::AddActivityDescription { .. } => {
                println!("Description (optional, Enter to skip):")
            }
            MenuState::AddActivityDuration { .. } => println!("Duration in working days:"),
            MenuState::DeleteActivity => {
                self.display.show_activities(&self.ctx.schedule);
                println!("Name of the activity to delete:");
            }
            MenuState::AddRelationshipPredecessor => {
                self.display.show_activities(&self.ctx.schedule);
                println!("Predecessor activity name:");
            }
            MenuState::AddRelationshipSuccessor { .. } => println!("Successor activity name:"),
            MenuState::AddRelationshipType { .. } => {
                println!("Relationship type (FS, SS, FF, SF):")
            }
            MenuState::AddRelationshipLag { .. } => {
                println!("Lag in working days (Enter for 0):")
            }
            MenuState::DeleteRelationship => {
                self.display.show_relationships(&self.ctx.schedule);
                println!("Enter the # of the relationship to delete:");
            }
            MenuState::DissolveActivity => {
                self.display.show_activities(&self.ctx.schedule);
                println!("Name of the activity to dissolve (its neighbors stay connected):");
            }
            MenuState::Prompt => {
                println!("Describe the scope change, or ask a question about the schedule:")
            }
            MenuState::ConfirmChanges { .. } => println!("Accept these changes? (Y/N):"),
        }
        Ok(())
    }

    fn handle_input(&mut self, input: &str) -> Result<FlowCtrl> {
        let state = std::mem::replace(&mut self.state, MenuState::Menu);
        match state {
            MenuState::Menu => self.handle_menu_choice(input),
            MenuState::AddActivityName => {
                if input.trim().is_empty() {
                    self.state = MenuState::AddActivityName;
                } else {
                    self.state = MenuState::AddActivityDescription {
                        name: input.trim().to_string(),
                    };
                }
                Ok(FlowCtrl::Continue)
            }
            MenuState::AddActivityDescription { name } => {
                self.state = MenuState::AddActivityDuration {
                    name,
                    description: input.trim().to_string(),
                };
                Ok(FlowCtrl::Continue)
            }
            MenuState::AddActivityDuration { name, description } => {
                self.finish_add_activity(name, description, input)
            }
            MenuState::DeleteActivity => self.finish_delete_activity(input),
            MenuState::AddRelationshipPredecessor => {
                self.state = MenuState::AddRelationshipSuccessor {
                    predecessor: input.trim().to_string(),
                };
                Ok(FlowCtrl::Continue)
            }
            MenuState::AddRelationshipSuccessor { predecessor } => {
                self.state = MenuState::AddRelationshipType {
                    predecessor,
                    successor: input.trim().to_string(),
                };
                Ok(FlowCtrl::Continue)
            }
            MenuState::AddRelationshipType { predecessor, successor } => {
                self.state = MenuState::AddRelationshipLag {
                    predecessor,
                    successor,
                    relation: input.trim().to_string(),
                };
                Ok(FlowCtrl::Continue)
            }
            MenuState::AddRelationshipLag {
                predecessor,
                successor,
                relation,
            } => self.finish_add_relationship(predecessor, successor, relation, input),
            MenuState::DeleteRelationship => self.finish_delete_relationship(input),
            MenuState::DissolveActivity => self.finish_dissolve(input),
            MenuState::Prompt => self.handle_prompt(input),
            MenuState::ConfirmChanges { ledger } => self.handle_confirm(ledger, input),
        }
    }
}
