// ── Combined command ──
//
// Dispatches one invocation to every member executable at dispatch time.
// Executable while at least one member is, unless an explicit signal
// overrides the derived OR.

use tracing::debug;

use super::{Command, Outcome};
use crate::reactive::Observable;
use crate::scope::Scope;

impl<O: Clone + 'static, I: Clone + 'static> Command<O, I> {
    /// Aggregate `members` into one command.
    ///
    /// The combined result is the ordered list of results from the members
    /// that actually executed. A member refused at dispatch time is skipped;
    /// a member whose effect faults is left out of the result (the fault is
    /// still published on that member's own `faults()` stream).
    pub fn combined(
        scope: &Scope,
        name: impl Into<String>,
        members: Vec<Command<O, I>>,
        can_execute: Option<&Observable<bool>>,
    ) -> Command<Vec<O>, I> {
        let name = name.into();
        let derived;
        let signal = match can_execute {
            Some(signal) => signal,
            None => {
                derived = any_executable(&members);
                &derived
            }
        };

        let label = name.clone();
        Command::create_with(scope, name, signal, move |input: I| {
            let mut results = Vec::with_capacity(members.len());
            for member in &members {
                match member.execute(input.clone()) {
                    Outcome::Executed(output) => results.push(output),
                    Outcome::Refused => {
                        debug!(command = %label, member = %member.name(), "member skipped");
                    }
                    Outcome::Faulted(_) => {
                        debug!(command = %label, member = %member.name(), "member faulted");
                    }
                }
            }
            results
        })
    }
}

/// OR over the members' can-execute signals.
fn any_executable<O: Clone + 'static, I: Clone + 'static>(
    members: &[Command<O, I>],
) -> Observable<bool> {
    Observable::combine_latest_all(members.iter().map(|m| m.can_execute().observe()))
        .map(|flags: &Vec<bool>| flags.iter().any(|f| *f))
}
