use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use manta_agent_component::Agent;

const POSTFIX: &str = r"#(?P<idx>[0-9]+)\z";

/// Ordered list of negotiating agents with unique names.
/// Order decides who proposes in which round.
#[derive(Default)]
pub struct Roster {
    agents: Vec<(String, Arc<dyn Agent>)>,
    names: HashSet<String>,
}

impl Roster {
    pub fn new() -> Roster {
        Roster::default()
    }

    pub fn with(agents: Vec<(String, Box<dyn Agent>)>) -> Roster {
        let mut roster = Roster::new();
        for (name, agent) in agents {
            roster.add_agent(name, agent);
        }
        roster
    }

    /// Function will rename agent, if the name was already used.
    /// Function adds subsequent numbers to string for example:
    /// from `buyer` it will make `buyer#1` and than `buyer#2`.
    /// Returns name under which agent was registered.
    pub fn add_agent(&mut self, mut name: String, agent: Box<dyn Agent>) -> String {
        let re = Regex::new(POSTFIX).ok();

        while self.names.contains(&name) {
            name = match re.as_ref().and_then(|re| next_postfix(re, &name)) {
                Some(renamed) => renamed,
                None => format!("{name}#1"),
            };
        }

        self.agents.push((name.clone(), Arc::from(agent)));
        self.names.insert(name.clone());
        name
    }

    pub fn names(&self) -> Vec<String> {
        self.agents.iter().map(|(name, _)| name).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agent at position `idx` modulo number of agents.
    pub fn get(&self, idx: usize) -> Option<(&str, Arc<dyn Agent>)> {
        match self.agents.is_empty() {
            true => None,
            false => {
                let (name, agent) = &self.agents[idx % self.agents.len()];
                Some((name.as_str(), agent.clone()))
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Arc<dyn Agent>)> {
        self.agents
            .iter()
            .map(|(name, agent)| (name.as_str(), agent.clone()))
    }
}

/// `buyer#1` -> `buyer#2`. `None` if name has no numeric postfix.
fn next_postfix(re: &Regex, name: &str) -> Option<String> {
    let idx = re.captures(name)?.name("idx")?.as_str().parse::<u32>().ok()? + 1;
    Some(re.replace(name, format!("#{idx}")).to_string())
}
