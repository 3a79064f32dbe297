//! Bark selection.
//!
//! Ambient barks first ask the host's [`BarkProvider`] for a contextual
//! line and fall back to the built-in pools below. Only the trigger and
//! selection rules matter to the simulation; the wording is placeholder
//! content a host is expected to replace.

use crate::agent::{Agent, AlertIcon, Faction, Job};
use crate::law::CrimeKind;
use crate::player::SocialStanding;
use crate::rng::SimRng;

/// Situation an ambient bark is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarkContext {
    /// Working at the work position
    Work,
    /// Socializing
    Social,
    /// The player is nearby but not close
    PlayerNear,
}

/// Source of contextual barks supplied by the host.
pub trait BarkProvider {
    /// A line for `agent` in `context`, or `None` to use the built-in pool.
    fn context_bark(&self, agent: &Agent, context: BarkContext, rng: &mut SimRng)
        -> Option<String>;
}

/// Provider that always defers to the built-in pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinBarks;

impl BarkProvider for BuiltinBarks {
    fn context_bark(&self, _agent: &Agent, _context: BarkContext, _rng: &mut SimRng) -> Option<String> {
        None
    }
}

/// World facts the built-in pools depend on.
#[derive(Debug, Clone, Copy)]
pub struct BarkScene {
    /// Fractional hour of day
    pub hour: f32,
    /// Player's apparent class
    pub player_class: SocialStanding,
    /// Player's global reputation
    pub player_reputation: i32,
    /// Number of crimes in the recent log
    pub recent_crimes: usize,
}

/// Picks an ambient line: provider first, then the built-in pool.
pub fn ambient_bark(
    provider: &dyn BarkProvider,
    agent: &Agent,
    context: BarkContext,
    scene: &BarkScene,
    rng: &mut SimRng,
) -> String {
    if let Some(line) = provider.context_bark(agent, context, rng) {
        return line;
    }
    let pool = match context {
        BarkContext::Work => work_lines(agent.job).to_vec(),
        BarkContext::Social => social_lines(agent, scene),
        BarkContext::PlayerNear => awareness_lines(agent, scene),
    };
    pick(&pool, rng)
}

fn pick(pool: &[&str], rng: &mut SimRng) -> String {
    rng.pick(pool).copied().unwrap_or("...").to_string()
}

fn work_lines(job: Job) -> &'static [&'static str] {
    match job {
        Job::Farmer => &[
            "Another long day...",
            "Rain would be welcome.",
            "The soil is good this year.",
            "Back aches something fierce.",
        ],
        Job::Guard => &["Stay out of trouble.", "Keep moving.", "All quiet.", "Nothing to report."],
        Job::Blacksmith => &["*clang clang*", "Fine steel, this.", "Need more iron...", "This edge will hold."],
        Job::Merchant => &["Best prices in town!", "Come, see my wares!", "Fair deals here!", "Quality goods!"],
        Job::TavernKeeper => &["What can I get you?", "Ale is fresh today.", "Welcome, friend.", "Take a seat."],
        Job::Woodcutter => &["Timber!", "Good oak here.", "One more tree...", "These woods are deep."],
        _ => &["...", "Hmm.", "*sigh*", "What a day."],
    }
}

fn social_lines(agent: &Agent, scene: &BarkScene) -> Vec<&'static str> {
    if agent.faction == Faction::Bandits {
        return vec![
            "When is the next raid?",
            "I need more coin.",
            "Lothar says we move at dawn.",
            "This forest hides us well.",
        ];
    }
    let mut lines = vec![
        "Have you heard the news?",
        "Weather is turning.",
        "Times are tough.",
        "Stay safe out there.",
    ];
    if scene.recent_crimes > 0 {
        lines.extend([
            "Did you hear about the trouble?",
            "Someone committed a crime recently...",
            "The guards are on alert.",
        ]);
    }
    lines
}

fn awareness_lines(agent: &Agent, scene: &BarkScene) -> Vec<&'static str> {
    let mut lines = Vec::new();
    if scene.hour >= 20.0 || scene.hour < 5.0 {
        lines.extend(["Dark out tonight.", "I should head home.", "Strange hour to be about."]);
    } else if scene.hour < 8.0 {
        lines.extend(["Early riser, eh?", "Morning.", "Dawn breaks."]);
    } else {
        lines.extend(["Fine day.", "Greetings.", "Watch yourself."]);
    }
    if scene.player_class == SocialStanding::Peasant && agent.social_class >= 3 {
        lines.extend(["What brings a peasant here?", "Mind your place."]);
    }
    if scene.player_reputation < -20 {
        lines.extend(["I know your kind.", "Keep your distance.", "Trouble follows you."]);
    } else if scene.player_reputation > 20 {
        lines.extend(["Good to see you.", "You are well-known around here.", "A friend of the people."]);
    }
    lines
}

/// Greeting line plus an optional overhead icon and its duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Greeting {
    /// Line to bark
    pub line: String,
    /// Icon to show
    pub icon: Option<(AlertIcon, f32)>,
}

/// Chooses a greeting for the `times_met`-th encounter.
pub fn greeting(agent: &Agent, times_met: u32, player_class: SocialStanding, rng: &mut SimRng) -> Greeting {
    if times_met <= 1 {
        let line = match agent.job {
            Job::Guard => "Halt. State your business here.".to_string(),
            Job::Merchant => "A customer? Come, have a look!".to_string(),
            Job::TavernKeeper => "Welcome, traveler. Hungry?".to_string(),
            _ => pick(
                &["Hm? I have not seen you before.", "A new face around here.", "Who might you be?"],
                rng,
            ),
        };
        return Greeting {
            line,
            icon: Some((AlertIcon::Curious, 2.0)),
        };
    }
    if times_met < 4 {
        return Greeting {
            line: pick(&["You again.", "Back so soon?", "I remember you."], rng),
            icon: None,
        };
    }
    if agent.player_relation > 15 {
        let address = if player_class == SocialStanding::Peasant {
            "Good to see you, friend."
        } else {
            "Good to see you, sir."
        };
        return Greeting {
            line: pick(&["Ah, my friend!", "Welcome back!", address], rng),
            icon: None,
        };
    }
    if agent.player_relation < -15 {
        return Greeting {
            line: pick(&["Not you again.", "What do you want?", "Keep walking."], rng),
            icon: Some((AlertIcon::Alarmed, 1.5)),
        };
    }
    Greeting {
        line: pick(&["Greetings.", "Hello.", "Day to you."], rng),
        icon: None,
    }
}

/// Line shouted during combat.
pub fn combat_line(agent: &Agent, rng: &mut SimRng) -> String {
    let pool: &[&str] = if agent.faction == Faction::Bandits {
        &["Your gold is mine!", "Stand still!", "You picked the wrong fight!", "Ha!"]
    } else if agent.job == Job::Guard {
        &["Halt, criminal!", "You will not escape!", "In the name of the King!", "Surrender!"]
    } else {
        &["Leave me alone!", "Help!", "Stay back!", "Why are you doing this?"]
    };
    pick(pool, rng)
}

/// Line when giving up a losing fight.
pub fn yield_line(rng: &mut SimRng) -> String {
    pick(&["I yield!", "Mercy!", "I surrender!", "Enough! I give up!"], rng)
}

/// Line when backing off to recover.
pub fn retreat_line(rng: &mut SimRng) -> String {
    pick(&["Back off!", "Need room...", "Tch..."], rng)
}

/// Line after the player falls.
pub fn victory_line(rng: &mut SimRng) -> String {
    pick(&["That is done.", "It is over.", "Stay down."], rng)
}

/// Line when the player escapes.
pub const GIVE_UP_LINE: &str = "Coward ran off.";
/// Bandit ambush line.
pub const AMBUSH_LINE: &str = "Hah! Your coin or your life!";
/// Guard line on spotting a wanted player.
pub const WANTED_LINE: &str = "Halt! You are wanted for crimes!";
/// Guard warning for trespassers in restricted areas.
pub const RESTRICTED_LINE: &str = "You do not belong here. Move along.";
/// Guard rallying line after an assault nearby.
pub const GUARD_ALARM_LINE: &str = "To arms! Defend the people!";
/// Civilian line after an assault nearby.
pub const CIVILIAN_ALARM_LINE: &str = "Help! Murder!";

/// Guard salute for nobility.
#[must_use]
pub const fn salute_line(job: Job) -> &'static str {
    match job {
        Job::King => "Your Majesty.",
        _ => "My lord.",
    }
}

/// Civilian witness cry.
pub fn witness_cry(rng: &mut SimRng) -> String {
    pick(&["Help! Guards!", "Stop! Thief!", "Murder!", "Someone, help!"], rng)
}

/// Guard callout on witnessing a crime.
#[must_use]
pub const fn crime_callout(kind: CrimeKind) -> &'static str {
    match kind {
        CrimeKind::Theft => "Stop right there, thief!",
        CrimeKind::Trespass => "You are not allowed here!",
        CrimeKind::Assault => "Drop your weapon! You are under arrest!",
        CrimeKind::Murder => "Murderer! You will pay for this!",
        CrimeKind::Pickpocket | CrimeKind::Other => "Halt! You have committed a crime!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tests::test_agent;
    use glam::Vec2;

    struct Fixed;

    impl BarkProvider for Fixed {
        fn context_bark(&self, _agent: &Agent, context: BarkContext, _rng: &mut SimRng) -> Option<String> {
            (context == BarkContext::Work).then(|| "custom".to_string())
        }
    }

    fn scene() -> BarkScene {
        BarkScene {
            hour: 12.0,
            player_class: SocialStanding::Peasant,
            player_reputation: 0,
            recent_crimes: 0,
        }
    }

    #[test]
    fn test_provider_wins_then_fallback() {
        let mut rng = SimRng::seeded(2);
        let agent = test_agent(Job::Blacksmith, Vec2::ZERO);
        assert_eq!(ambient_bark(&Fixed, &agent, BarkContext::Work, &scene(), &mut rng), "custom");
        let line = ambient_bark(&Fixed, &agent, BarkContext::Social, &scene(), &mut rng);
        assert!(social_lines(&agent, &scene()).contains(&line.as_str()));
    }

    #[test]
    fn test_first_greeting_is_job_specific() {
        let mut rng = SimRng::seeded(2);
        let guard = test_agent(Job::Guard, Vec2::ZERO);
        let g = greeting(&guard, 1, SocialStanding::Peasant, &mut rng);
        assert_eq!(g.line, "Halt. State your business here.");
        assert_eq!(g.icon, Some((AlertIcon::Curious, 2.0)));
    }

    #[test]
    fn test_hostile_greeting_shows_alarm() {
        let mut rng = SimRng::seeded(2);
        let mut agent = test_agent(Job::Villager, Vec2::ZERO);
        agent.player_relation = -40;
        let g = greeting(&agent, 6, SocialStanding::Peasant, &mut rng);
        assert_eq!(g.icon, Some((AlertIcon::Alarmed, 1.5)));
    }

    #[test]
    fn test_rumors_after_crimes() {
        let agent = test_agent(Job::Villager, Vec2::ZERO);
        let mut s = scene();
        let quiet = social_lines(&agent, &s).len();
        s.recent_crimes = 3;
        assert_eq!(social_lines(&agent, &s).len(), quiet + 3);
    }

    #[test]
    fn test_peasant_snub_from_high_class() {
        let guard = test_agent(Job::Guard, Vec2::ZERO);
        assert!(awareness_lines(&guard, &scene()).contains(&"Mind your place."));
    }
}
