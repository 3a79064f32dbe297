//! The default valley population: Ashford town, the villages of
//! Millhaven and Thornfield, a bandit camp and two travelling traders.
//!
//! Positions are given in tiles and scaled by the terrain tile size.

use glam::Vec2;
use tracing::info;

use crate::agent::{AgentName, AgentSpec, Faction, Gender, Job, Personality};
use crate::rng::SimRng;
use crate::simulation::SimulationWorld;

/// Tile positions of the Ashford gathering spots.
pub const ASHFORD_TAVERN: (f32, f32) = (116.0, 128.0);
/// Market square, the daytime gathering spot.
pub const ASHFORD_MARKET: (f32, f32) = (128.0, 128.0);

const GUARD_PATROLS: [[(f32, f32); 4]; 5] = [
    [(110.0, 128.0), (128.0, 128.0), (146.0, 128.0), (128.0, 128.0)],
    [(128.0, 110.0), (128.0, 128.0), (128.0, 146.0), (128.0, 128.0)],
    [(110.0, 110.0), (146.0, 110.0), (146.0, 146.0), (110.0, 146.0)],
    [(128.0, 148.0), (128.0, 150.0), (130.0, 150.0), (126.0, 150.0)],
    [(108.0, 128.0), (106.0, 128.0), (106.0, 130.0), (108.0, 130.0)],
];

const COMMONER_HOMES: [(f32, f32); 8] = [
    (114.0, 114.0),
    (121.0, 114.0),
    (114.0, 119.0),
    (135.0, 135.0),
    (141.0, 135.0),
    (135.0, 119.0),
    (121.0, 135.0),
    (141.0, 121.0),
];

/// Spawns the default roster into `world` and registers the Ashford
/// venues. Returns the number of agents spawned.
pub fn spawn_default_population(world: &mut SimulationWorld, tile_size: f32) -> usize {
    let t = |x: f32, y: f32| Vec2::new(x * tile_size, y * tile_size);
    let before = world.agents().len();

    world.venues_mut().insert(
        "ashford",
        t(ASHFORD_TAVERN.0, ASHFORD_TAVERN.1),
        t(ASHFORD_MARKET.0, ASHFORD_MARKET.1),
    );

    spawn_ashford(world, &t);
    spawn_millhaven(world, &t);
    spawn_thornfield(world, &t);
    spawn_bandits(world, &t);
    spawn_traders(world, &t);

    let spawned = world.agents().len() - before;
    info!(agents = spawned, "default population spawned");
    spawned
}

fn roll_age(rng: &mut SimRng, min: u32, max: u32) -> u32 {
    let span = (max - min + 1) as usize;
    rng.index(span).map_or(min, |n| min + n as u32)
}

fn roll_personality(rng: &mut SimRng, options: &[Personality]) -> Personality {
    rng.pick(options).copied().unwrap_or(Personality::Calm)
}

fn spawn_ashford(world: &mut SimulationWorld, t: &impl Fn(f32, f32) -> Vec2) {
    let throne = t(141.0, 114.0);
    world.spawn(
        AgentSpec::new(Job::King, throne)
            .named(AgentName::new("Aldric", "Valdren").titled("King Aldric Valdren"))
            .with_gender(Gender::Male)
            .with_age(52)
            .with_health(120.0)
            .with_combat(15.0, 30.0)
            .with_faction(Faction::Crown)
            .with_personality(Personality::Calm)
            .with_location("ashford"),
    );

    for i in 0..3 {
        let i = i as f32;
        let age = roll_age(world.rng_mut(), 30, 60);
        let personality = roll_personality(
            world.rng_mut(),
            &[Personality::Suspicious, Personality::Greedy, Personality::Calm],
        );
        let home = t(140.0 + i * 2.0, 121.0 + i);
        world.spawn(
            AgentSpec::new(Job::Noble, home)
                .with_age(age)
                .with_work(throne)
                .with_faction(Faction::Nobles)
                .with_personality(personality)
                .with_combat(8.0, 10.0)
                .with_relation(-5)
                .with_location("ashford"),
        );
    }

    for i in 0..8 {
        let route: Vec<Vec2> = GUARD_PATROLS[i % GUARD_PATROLS.len()]
            .iter()
            .map(|&(x, y)| t(x, y))
            .collect();
        let start = route[0];
        let age = roll_age(world.rng_mut(), 22, 45);
        let personality = roll_personality(
            world.rng_mut(),
            &[Personality::Brave, Personality::Calm, Personality::Suspicious],
        );
        world.spawn(
            AgentSpec::new(Job::Guard, start)
                .with_gender(Gender::Male)
                .with_age(age)
                .with_home(t(113.0, 139.0))
                .with_work(start)
                .with_health(100.0)
                .with_combat(12.0, 20.0)
                .with_faction(Faction::Guards)
                .with_personality(personality)
                .with_speed(70.0)
                .with_patrol(route)
                .with_aggression(0.7)
                .with_location("ashford"),
        );
    }

    let tavern = t(116.0, 127.0);
    world.spawn(
        AgentSpec::new(Job::TavernKeeper, tavern)
            .named(AgentName::new("Gerda", "Holden"))
            .with_gender(Gender::Female)
            .with_age(45)
            .with_personality(Personality::Friendly)
            .with_relation(5)
            .with_location("ashford")
            .with_inventory(["ale", "bread", "stew"]),
    );

    let forge = t(137.0, 127.0);
    world.spawn(
        AgentSpec::new(Job::Blacksmith, forge)
            .named(AgentName::new("Roderic", "Stone"))
            .with_gender(Gender::Male)
            .with_age(38)
            .with_home(t(137.0, 130.0))
            .with_work(forge)
            .with_personality(Personality::Honest)
            .with_location("ashford")
            .with_inventory(["sword", "axe", "shield", "leather_armor", "chain_armor"]),
    );

    for i in 0..3 {
        let i = i as f32;
        let stall = t(124.0 + i * 3.0, 121.0);
        let age = roll_age(world.rng_mut(), 25, 55);
        let personality = roll_personality(
            world.rng_mut(),
            &[Personality::Friendly, Personality::Greedy, Personality::Honest],
        );
        world.spawn(
            AgentSpec::new(Job::Merchant, stall)
                .with_age(age)
                .with_home(t(113.0 + i * 10.0, 114.0))
                .with_work(stall)
                .with_personality(personality)
                .with_location("ashford")
                .with_inventory(["grain", "tools", "cloth", "bread"]),
        );
    }

    for &(hx, hy) in &COMMONER_HOMES {
        let home = t(hx + 2.0, hy + 2.0);
        let age = roll_age(world.rng_mut(), 16, 60);
        let wx = roll_age(world.rng_mut(), 112, 145) as f32;
        let wy = roll_age(world.rng_mut(), 112, 145) as f32;
        world.spawn(
            AgentSpec::new(Job::Villager, home)
                .with_age(age)
                .with_work(t(wx, wy))
                .with_location("ashford"),
        );
    }
}

fn spawn_millhaven(world: &mut SimulationWorld, t: &impl Fn(f32, f32) -> Vec2) {
    let (mx, my) = (66.0, 190.0);
    let millhaven = || Faction::Settlement("millhaven".to_string());

    world.spawn(
        AgentSpec::new(Job::Villager, t(mx, my))
            .named(AgentName::new("Edmund", "Ashford"))
            .with_gender(Gender::Male)
            .with_age(62)
            .with_home(t(mx - 5.0, my - 3.0))
            .with_work(t(mx, my))
            .with_faction(millhaven())
            .with_personality(Personality::Friendly)
            .with_relation(10)
            .with_location("millhaven"),
    );

    for i in 0..3 {
        let fi = i as f32;
        let age = roll_age(world.rng_mut(), 20, 50);
        let home_y = if i > 1 { my + 3.0 } else { my - 3.0 };
        world.spawn(
            AgentSpec::new(Job::Farmer, t(mx - 4.0 + fi * 4.0, my + 2.0))
                .with_age(age)
                .with_home(t(mx - 5.0 + fi * 8.0, home_y))
                .with_work(t(55.0 + fi * 8.0, 178.0))
                .with_faction(millhaven())
                .with_location("millhaven"),
        );
    }

    world.spawn(
        AgentSpec::new(Job::Merchant, t(mx + 6.0, my + 1.0))
            .named(AgentName::new("Maren", "Cooper"))
            .with_gender(Gender::Female)
            .with_age(34)
            .with_home(t(mx + 5.0, my + 4.0))
            .with_faction(millhaven())
            .with_personality(Personality::Friendly)
            .with_relation(5)
            .with_location("millhaven")
            .with_inventory(["bread", "grain", "knife", "bandage"]),
    );

    for i in 0..3 {
        let fi = i as f32;
        let age = roll_age(world.rng_mut(), 16, 55);
        world.spawn(
            AgentSpec::new(Job::Villager, t(mx - 2.0 + fi * 3.0, my - 1.0 + fi))
                .with_age(age)
                .with_home(t(mx - 5.0 + fi * 8.0, my + 4.0))
                .with_work(t(mx + fi * 2.0, my))
                .with_faction(millhaven())
                .with_location("millhaven"),
        );
    }
}

fn spawn_thornfield(world: &mut SimulationWorld, t: &impl Fn(f32, f32) -> Vec2) {
    let (tx, ty) = (66.0, 64.0);
    let thornfield = || Faction::Settlement("thornfield".to_string());

    world.spawn(
        AgentSpec::new(Job::Woodcutter, t(tx, ty))
            .named(AgentName::new("Henrik", "Sawyer"))
            .with_gender(Gender::Male)
            .with_age(35)
            .with_home(t(tx - 5.0, ty - 3.0))
            .with_work(t(45.0, 40.0))
            .with_faction(thornfield())
            .with_personality(Personality::Brave)
            .with_location("thornfield"),
    );

    world.spawn(
        AgentSpec::new(Job::Villager, t(tx + 1.0, ty + 1.0))
            .named(AgentName::new("Oswin", "Thatcher"))
            .with_gender(Gender::Male)
            .with_age(58)
            .with_home(t(tx + 4.0, ty - 3.0))
            .with_work(t(tx, ty))
            .with_faction(thornfield())
            .with_personality(Personality::Honest)
            .with_location("thornfield"),
    );

    for i in 0..3 {
        let fi = i as f32;
        let age = roll_age(world.rng_mut(), 18, 50);
        world.spawn(
            AgentSpec::new(Job::Villager, t(tx - 3.0 + fi * 4.0, ty + 2.0))
                .with_age(age)
                .with_home(t(tx - 5.0 + fi * 8.0, ty + 4.0))
                .with_work(t(tx - 2.0 + fi * 3.0, ty))
                .with_faction(thornfield())
                .with_location("thornfield"),
        );
    }

    let age = roll_age(world.rng_mut(), 25, 45);
    world.spawn(
        AgentSpec::new(Job::Merchant, t(tx + 6.0, ty + 1.0))
            .with_age(age)
            .with_home(t(tx + 5.0, ty + 4.0))
            .with_work(t(tx + 6.0, ty + 1.0))
            .with_faction(thornfield())
            .with_location("thornfield")
            .with_inventory(["bread", "wood", "hatchet"]),
    );
}

fn spawn_bandits(world: &mut SimulationWorld, t: &impl Fn(f32, f32) -> Vec2) {
    let (bx, by) = (200.0, 80.0);
    world.spawn(
        AgentSpec::new(Job::Bandit, t(bx, by))
            .named(AgentName::new("Lothar", "Voss"))
            .with_gender(Gender::Male)
            .with_age(40)
            .with_health(110.0)
            .with_combat(16.0, 15.0)
            .with_faction(Faction::Bandits)
            .with_personality(Personality::Hostile)
            .with_aggression(0.9)
            .with_speed(65.0)
            .with_relation(-20)
            .with_location("banditCamp"),
    );

    for i in 0..5u8 {
        let fi = f32::from(i);
        let camp = t(bx - 3.0 + fi * 2.0, by - 1.0);
        let age = roll_age(world.rng_mut(), 20, 40);
        world.spawn(
            AgentSpec::new(Job::Bandit, t(bx - 4.0 + fi * 2.0, by - 2.0 + f32::from(i % 3)))
                .with_age(age)
                .with_home(camp)
                .with_work(camp)
                .with_health(70.0)
                .with_combat(10.0 + fi, 5.0)
                .with_faction(Faction::Bandits)
                .with_personality(Personality::Hostile)
                .with_aggression(0.8)
                .with_speed(55.0 + fi * 3.0)
                .with_relation(-15)
                .with_location("banditCamp"),
        );
    }
}

fn spawn_traders(world: &mut SimulationWorld, t: &impl Fn(f32, f32) -> Vec2) {
    let market = t(ASHFORD_MARKET.0, ASHFORD_MARKET.1);
    world.spawn(
        AgentSpec::new(Job::Merchant, t(90.0, 160.0))
            .named(AgentName::new("Ingram", "Brennan"))
            .with_gender(Gender::Male)
            .with_age(42)
            .with_home(t(66.0, 190.0))
            .with_work(market)
            .with_personality(Personality::Friendly)
            .with_speed(55.0)
            .with_inventory(["bread", "wine", "cloth", "spice"]),
    );
    world.spawn(
        AgentSpec::new(Job::Merchant, t(80.0, 90.0))
            .named(AgentName::new("Petra", "Lang"))
            .with_gender(Gender::Female)
            .with_age(35)
            .with_home(t(66.0, 64.0))
            .with_work(market)
            .with_personality(Personality::Honest)
            .with_speed(50.0)
            .with_inventory(["wood", "herbs", "pelts", "bread"]),
    );
}
