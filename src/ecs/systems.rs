use specs::prelude::*;

use super::{
    components::{CombatStats, PlayerStats, Regeneration, ResourcePool},
    resources::{Clock, RegenRates},
};

/// Trickles hitpoints back to every actor, and stamina and magic back to the
/// player, in proportion to the ticks since its last pass.
#[derive(Default)]
pub struct RegenerationSystem;

impl<'a> System<'a> for RegenerationSystem {
    type SystemData = (
        ReadExpect<'a, Clock>,
        ReadExpect<'a, RegenRates>,
        WriteStorage<'a, Regeneration>,
        WriteStorage<'a, CombatStats>,
        WriteStorage<'a, PlayerStats>,
    );

    fn run(&mut self, (clock, rates, mut regens, mut stats, mut players): Self::SystemData) {
        for (regen, stat, player) in (&mut regens, &mut stats, (&mut players).maybe()).join() {
            let elapsed = clock.tick.saturating_sub(regen.last_tick) as f64;
            regen.last_tick = regen.last_tick.max(clock.tick);
            if elapsed <= 0.0 || !stat.is_alive() {
                continue;
            }

            let mut health = ResourcePool {
                current: stat.hp,
                max: stat.max_hp,
            };
            accrue(&mut health, &mut regen.health_carry, rates.health, elapsed);
            stat.hp = health.current;

            if let Some(player) = player {
                accrue(&mut player.stamina, &mut regen.stamina_carry, rates.stamina, elapsed);
                accrue(&mut player.magic, &mut regen.magic_carry, rates.magic, elapsed);
            }
        }
    }
}

/// Whole points go into the pool; the fraction stays in `carry`. A full pool
/// forfeits its carry.
fn accrue(pool: &mut ResourcePool, carry: &mut f64, rate: f64, elapsed: f64) {
    if pool.current >= pool.max {
        *carry = 0.0;
        return;
    }
    *carry += f64::from(pool.max) * rate * elapsed;
    let whole = carry.floor();
    if whole >= 1.0 {
        pool.restore(whole as i32);
        *carry -= whole;
    }
    if pool.current >= pool.max {
        *carry = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_rates_accumulate_across_passes() {
        let mut pool = ResourcePool { current: 10, max: 100 };
        let mut carry = 0.0;
        for _ in 0..4 {
            accrue(&mut pool, &mut carry, 0.001, 3.0);
        }
        // 0.3 per pass, so one point after four passes
        assert_eq!(pool.current, 11);
        assert!((carry - 0.2).abs() < 1e-9);
    }

    #[test]
    fn full_pool_drops_carry() {
        let mut pool = ResourcePool { current: 99, max: 100 };
        let mut carry = 0.0;
        accrue(&mut pool, &mut carry, 0.5, 10.0);
        assert_eq!(pool.current, 100);
        assert_eq!(carry, 0.0);
    }
}
