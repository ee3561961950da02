//! Room exit/gate encoding (spec.md §3 "Room" exits: passable / door /
//! locked / bombable / walled, plus enemy groups).
//!
//! Grounded on `neutopia/src/object.rs`'s tagged-byte `nom` grammar
//! (`alt!` over single-byte tags, fixed-width payloads per tag); the
//! variant catalog is narrowed from Neutopia's sprite/object table to the
//! exit classification this spec actually needs.

use failure::{format_err, Error};
use nom::{
    branch::alt,
    bytes::complete::{tag, take},
    multi::many0,
    IResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    Passable(Coord),
    Door(u8),
    LockedDoor(u8),
    BombableDoor(u8),
    Walled,
    DarkRoom,
    BossDoor(u8),
    EnemyGatedDoor(u8),
}

fn parse_coord(i: &[u8]) -> IResult<&[u8], Coord> {
    let (i, loc) = take(1usize)(i)?;
    let x = loc[0] & 0xf;
    let y = loc[0] >> 4;
    Ok((i, Coord { x, y }))
}

fn parse_passable(i: &[u8]) -> IResult<&[u8], Exit> {
    let (i, _) = tag([0x00])(i)?;
    let (i, coord) = parse_coord(i)?;
    Ok((i, Exit::Passable(coord)))
}

fn parse_door(i: &[u8]) -> IResult<&[u8], Exit> {
    let (i, _) = tag([0x01])(i)?;
    let (i, data) = take(1usize)(i)?;
    Ok((i, Exit::Door(data[0])))
}

fn parse_locked_door(i: &[u8]) -> IResult<&[u8], Exit> {
    let (i, _) = tag([0x02])(i)?;
    let (i, data) = take(1usize)(i)?;
    Ok((i, Exit::LockedDoor(data[0])))
}

fn parse_bombable_door(i: &[u8]) -> IResult<&[u8], Exit> {
    let (i, _) = tag([0x03])(i)?;
    let (i, data) = take(1usize)(i)?;
    Ok((i, Exit::BombableDoor(data[0])))
}

fn parse_walled(i: &[u8]) -> IResult<&[u8], Exit> {
    let (i, _) = tag([0x04])(i)?;
    Ok((i, Exit::Walled))
}

fn parse_dark_room(i: &[u8]) -> IResult<&[u8], Exit> {
    let (i, _) = tag([0x09])(i)?;
    Ok((i, Exit::DarkRoom))
}

fn parse_boss_door(i: &[u8]) -> IResult<&[u8], Exit> {
    let (i, _) = tag([0x0a])(i)?;
    let (i, data) = take(1usize)(i)?;
    Ok((i, Exit::BossDoor(data[0])))
}

fn parse_enemy_gated_door(i: &[u8]) -> IResult<&[u8], Exit> {
    let (i, _) = tag([0x0b])(i)?;
    let (i, data) = take(1usize)(i)?;
    Ok((i, Exit::EnemyGatedDoor(data[0])))
}

fn parse_exit(i: &[u8]) -> IResult<&[u8], Exit> {
    alt((
        parse_passable,
        parse_door,
        parse_locked_door,
        parse_bombable_door,
        parse_walled,
        parse_dark_room,
        parse_boss_door,
        parse_enemy_gated_door,
    ))(i)
}

/// Parse a variable-length, nul-unterminated exit table (room object table
/// equivalent).
pub fn parse_exit_table(data: &[u8]) -> Result<Vec<Exit>, Error> {
    let (i, table) = many0(parse_exit)(data).map_err(|e| format_err!("exit table parse error: {}", e))?;

    if !i.is_empty() {
        return Err(format_err!("unparsed exit table input: {:x?}", i));
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries() {
        assert_eq!(
            parse_exit(&[0x00, 0x52]),
            Ok((&[][..], Exit::Passable(Coord { x: 2, y: 5 })))
        );
        assert_eq!(parse_exit(&[0x01, 0x02]), Ok((&[][..], Exit::Door(0x02))));
        assert_eq!(
            parse_exit(&[0x02, 0x01]),
            Ok((&[][..], Exit::LockedDoor(0x01)))
        );
        assert_eq!(
            parse_exit(&[0x03, 0x08]),
            Ok((&[][..], Exit::BombableDoor(0x08)))
        );
        assert_eq!(parse_exit(&[0x04]), Ok((&[][..], Exit::Walled)));
        assert_eq!(parse_exit(&[0x09]), Ok((&[][..], Exit::DarkRoom)));
        assert_eq!(
            parse_exit(&[0x0a, 0x50]),
            Ok((&[][..], Exit::BossDoor(0x50)))
        );

        assert_eq!(
            parse_exit_table(&[0x01, 0x02, 0x02, 0x01]).unwrap(),
            vec![Exit::Door(0x02), Exit::LockedDoor(0x01)]
        );
    }
}
