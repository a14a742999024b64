//! Moving entities: trains, aircraft, ships, the monster, tornados, and
//! explosion markers.
//!
//! Sprites live in a contiguous registry and are swap-removed at the end of
//! every frame once their frame hits zero. Positions are in 1/16-tile units.
//! Motion is a straight advance toward `dest` each active frame; the monster
//! and the tornado grind tiles to rubble along the way.

use bevy::prelude::*;

use crate::clock::CityClock;
use crate::map::{MapSerial, TileMap};
use crate::sim_rng::SimRng;
use crate::tiles::{Cell, BULLBIT, RUBBLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub enum SpriteKind {
    Train,
    Helicopter,
    Airplane,
    Ship,
    Monster,
    Tornado,
    Explosion,
    Bus,
}

#[derive(Debug, Clone, bitcode::Encode, bitcode::Decode)]
pub struct Sprite {
    pub kind: SpriteKind,
    /// Animation frame; 0 hides the sprite and marks it for removal.
    pub frame: u8,
    pub x: i32,
    pub y: i32,
    pub dest_x: i32,
    pub dest_y: i32,
    /// Remaining lifetime in frames; 0 is already expired, negative never
    /// expires on its own.
    pub count: i32,
    pub dir: u8,
    pub speed: i32,
    pub flag: u8,
}

impl Sprite {
    fn at_tile(kind: SpriteKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            frame: 1,
            x: x * 16 + 8,
            y: y * 16 + 8,
            dest_x: x * 16 + 8,
            dest_y: y * 16 + 8,
            count: -1,
            dir: 0,
            speed: 4,
            flag: 0,
        }
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.x.div_euclid(16), self.y.div_euclid(16))
    }
}

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct SpriteRegistry {
    sprites: Vec<Sprite>,
}

impl SpriteRegistry {
    pub fn spawn(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn has_kind(&self, kind: SpriteKind) -> bool {
        self.sprites.iter().any(|s| s.kind == kind)
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    pub fn make_train(&mut self, x: i32, y: i32) {
        let mut s = Sprite::at_tile(SpriteKind::Train, x, y);
        s.count = 128;
        self.spawn(s);
    }

    pub fn make_helicopter(&mut self, x: i32, y: i32, dest_x: i32, dest_y: i32) {
        let mut s = Sprite::at_tile(SpriteKind::Helicopter, x, y);
        s.count = 600;
        s.speed = 6;
        s.dest_x = dest_x * 16 + 8;
        s.dest_y = dest_y * 16 + 8;
        self.spawn(s);
    }

    pub fn make_airplane(&mut self, x: i32, y: i32, dest_x: i32, dest_y: i32) {
        let mut s = Sprite::at_tile(SpriteKind::Airplane, x, y);
        s.count = 480;
        s.speed = 12;
        s.dest_x = dest_x * 16 + 8;
        s.dest_y = dest_y * 16 + 8;
        self.spawn(s);
    }

    pub fn make_ship(&mut self, x: i32, y: i32, dest_x: i32, dest_y: i32) {
        let mut s = Sprite::at_tile(SpriteKind::Ship, x, y);
        s.count = 800;
        s.speed = 2;
        s.dest_x = dest_x * 16 + 8;
        s.dest_y = dest_y * 16 + 8;
        self.spawn(s);
    }

    pub fn make_monster(&mut self, x: i32, y: i32, dest_x: i32, dest_y: i32) {
        let mut s = Sprite::at_tile(SpriteKind::Monster, x, y);
        s.count = 1000;
        s.speed = 3;
        s.dest_x = dest_x * 16 + 8;
        s.dest_y = dest_y * 16 + 8;
        self.spawn(s);
    }

    pub fn make_tornado(&mut self, x: i32, y: i32, dest_x: i32, dest_y: i32) {
        let mut s = Sprite::at_tile(SpriteKind::Tornado, x, y);
        s.count = 200;
        s.speed = 5;
        s.dest_x = dest_x * 16 + 8;
        s.dest_y = dest_y * 16 + 8;
        self.spawn(s);
    }

    pub fn make_explosion(&mut self, x: i32, y: i32) {
        let mut s = Sprite::at_tile(SpriteKind::Explosion, x, y);
        s.count = 12;
        s.speed = 0;
        self.spawn(s);
    }

    /// First airborne sprite, for the air-crash disaster.
    pub fn find_aircraft(&self) -> Option<(i32, i32)> {
        self.sprites
            .iter()
            .find(|s| matches!(s.kind, SpriteKind::Airplane | SpriteKind::Helicopter))
            .map(Sprite::tile)
    }
}

fn crushes_tiles(kind: SpriteKind) -> bool {
    matches!(kind, SpriteKind::Monster | SpriteKind::Tornado)
}

/// Advance every live sprite one frame and swap-remove the dead.
pub fn update_sprites(
    clock: Res<CityClock>,
    mut sprites: ResMut<SpriteRegistry>,
    mut map: ResMut<TileMap>,
    mut serial: ResMut<MapSerial>,
    mut rng: ResMut<SimRng>,
) {
    if clock.current_phase().is_none() {
        return;
    }

    let mut crushed = false;
    for sprite in &mut sprites.sprites {
        if sprite.count > 0 {
            sprite.count -= 1;
            if sprite.count == 0 {
                sprite.frame = 0;
                continue;
            }
        }

        // The tornado drifts: its destination wanders as it travels.
        if sprite.kind == SpriteKind::Tornado && rng.range(7) == 0 {
            sprite.dest_x += rng.range(64) as i32 - 32;
            sprite.dest_y += rng.range(64) as i32 - 32;
        }

        let dx = sprite.dest_x - sprite.x;
        let dy = sprite.dest_y - sprite.y;
        sprite.x += dx.signum() * dx.abs().min(sprite.speed);
        sprite.y += dy.signum() * dy.abs().min(sprite.speed);

        if crushes_tiles(sprite.kind) {
            let (tx, ty) = sprite.tile();
            let cell = map.get(tx, ty);
            if cell.bulldozable() && !cell.zone_center() {
                map.set(tx, ty, Cell::new(RUBBLE + rng.range(3), BULLBIT));
                crushed = true;
            }
            if dx == 0 && dy == 0 {
                sprite.frame = 0;
            }
        } else {
            sprite.frame = sprite.frame.wrapping_add(1).max(1);
        }
    }
    if crushed {
        serial.bump();
    }

    let mut i = 0;
    while i < sprites.sprites.len() {
        if sprites.sprites[i].frame == 0 {
            sprites.sprites.swap_remove(i);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimSpeed;

    fn run_frames(world: &mut World, n: usize) {
        let mut schedule = Schedule::default();
        schedule.add_systems(update_sprites);
        for _ in 0..n {
            world.resource_mut::<CityClock>().advance();
            schedule.run(world);
        }
    }

    fn sprite_world() -> World {
        let mut world = World::new();
        let mut clock = CityClock::default();
        clock.speed = SimSpeed::Fast;
        world.insert_resource(clock);
        world.insert_resource(SpriteRegistry::default());
        world.insert_resource(TileMap::default());
        world.insert_resource(MapSerial::default());
        world.insert_resource(SimRng::new(7));
        world
    }

    #[test]
    fn test_explosion_expires_after_count() {
        let mut world = sprite_world();
        world
            .resource_mut::<SpriteRegistry>()
            .make_explosion(10, 10);
        run_frames(&mut world, 12);
        assert!(world.resource::<SpriteRegistry>().is_empty());
    }

    #[test]
    fn test_sprite_advances_toward_destination() {
        let mut world = sprite_world();
        world
            .resource_mut::<SpriteRegistry>()
            .make_airplane(10, 10, 30, 10);
        run_frames(&mut world, 5);
        let registry = world.resource::<SpriteRegistry>();
        let plane = registry.iter().next().unwrap();
        assert!(plane.x > 10 * 16 + 8);
        assert_eq!(plane.y, 10 * 16 + 8);
    }

    #[test]
    fn test_monster_crushes_bulldozable_tiles() {
        let mut world = sprite_world();
        {
            let mut map = world.resource_mut::<TileMap>();
            map.set(10, 10, Cell::new(crate::tiles::ROADS, BULLBIT));
        }
        world
            .resource_mut::<SpriteRegistry>()
            .make_monster(10, 10, 10, 10);
        let serial_before = world.resource::<MapSerial>().0;
        run_frames(&mut world, 1);
        let map = world.resource::<TileMap>();
        assert!(crate::tiles::is_rubble(map.get(10, 10).character()));
        assert!(world.resource::<MapSerial>().0 > serial_before);
    }

    #[test]
    fn test_paused_clock_freezes_sprites() {
        let mut world = sprite_world();
        world.resource_mut::<CityClock>().speed = SimSpeed::Paused;
        world
            .resource_mut::<SpriteRegistry>()
            .make_airplane(10, 10, 30, 10);
        run_frames(&mut world, 10);
        let registry = world.resource::<SpriteRegistry>();
        let plane = registry.iter().next().unwrap();
        assert_eq!(plane.x, 10 * 16 + 8);
    }

    #[test]
    fn test_find_aircraft() {
        let mut registry = SpriteRegistry::default();
        assert_eq!(registry.find_aircraft(), None);
        registry.make_helicopter(3, 4, 5, 6);
        assert_eq!(registry.find_aircraft(), Some((3, 4)));
    }
}
