//! Extraction feedback commands.

use crate::config::FeedbackConfig;
use minerworks_core::RegistryKey;
use minerworks_world::{EntityHost, EntityId};
use serde_json::json;
use tracing::debug;

/// Host commands announcing an extraction around every radar near the
/// acting player: particles, then sounds, then the chat line.
pub fn feedback_commands(config: &FeedbackConfig, trigger: &RegistryKey) -> Vec<String> {
    let at_radars = format!("execute at @e[type={trigger},r={}] run", config.radius);
    let mut commands = Vec::with_capacity(config.particles.len() + config.sounds.len() + 1);

    for particle in &config.particles {
        commands.push(format!("{at_radars} particle {particle} ~~~"));
    }
    for sound in &config.sounds {
        commands.push(format!("{at_radars} playsound {sound} @p"));
    }
    if !config.message.is_empty() {
        let rawtext = json!({ "rawtext": [{ "text": config.message }] });
        commands.push(format!(
            "{at_radars} tellraw @p[r={}] {rawtext}",
            config.chat_radius
        ));
    }
    commands
}

/// Run `commands` with `source` as the executing entity.
///
/// Rejected commands are logged and skipped. Returns how many the host
/// accepted.
pub fn dispatch_feedback<W: EntityHost>(world: &mut W, source: EntityId, commands: &[String]) -> usize {
    let mut accepted = 0;
    for command in commands {
        match world.run_command(source, command) {
            Ok(()) => accepted += 1,
            Err(err) => debug!(source = %source, command = %command, error = %err, "feedback command rejected"),
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use minerworks_core::DimensionId;
    use minerworks_world::{Location, SimWorld};

    fn radar() -> RegistryKey {
        RegistryKey::parse("miner:oreradar").unwrap()
    }

    #[test]
    fn default_feedback_matches_host_command_syntax() {
        let commands = feedback_commands(&FeedbackConfig::default(), &radar());
        assert_eq!(
            commands,
            vec![
                "execute at @e[type=miner:oreradar,r=9] run particle miner:radar ~~~",
                "execute at @e[type=miner:oreradar,r=9] run particle miner:radardot ~~~",
                "execute at @e[type=miner:oreradar,r=9] run playsound random.fizz @p",
                "execute at @e[type=miner:oreradar,r=9] run playsound beacon.activate @p",
                r#"execute at @e[type=miner:oreradar,r=9] run tellraw @p[r=5] {"rawtext":[{"text":"- §6Ores Have Been Found"}]}"#,
            ]
        );
    }

    #[test]
    fn message_is_json_escaped() {
        let config = FeedbackConfig {
            particles: Vec::new(),
            sounds: Vec::new(),
            message: "say \"hi\"".into(),
            ..FeedbackConfig::default()
        };
        let commands = feedback_commands(&config, &radar());
        assert_eq!(commands.len(), 1);
        assert!(commands[0].ends_with(r#"{"rawtext":[{"text":"say \"hi\""}]}"#));
    }

    #[test]
    fn empty_message_emits_no_chat_line() {
        let config = FeedbackConfig {
            message: String::new(),
            ..FeedbackConfig::default()
        };
        let commands = feedback_commands(&config, &radar());
        assert_eq!(commands.len(), 4);
        assert!(commands.iter().all(|c| !c.contains("tellraw")));
    }

    #[test]
    fn dispatch_counts_accepted_commands() {
        let mut world = SimWorld::new();
        let player = world.add_player(DimensionId::Overworld, Location::ZERO);
        let commands = feedback_commands(&FeedbackConfig::default(), &radar());
        assert_eq!(dispatch_feedback(&mut world, player, &commands), 5);

        world.despawn(player);
        assert_eq!(dispatch_feedback(&mut world, player, &commands), 0);
    }
}
