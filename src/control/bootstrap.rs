//! Demo site
//!
//! Seeds the three-level demo building with nine doors, four user groups and
//! their members. The schedules are anchored on `today`, so the same site can
//! be rebuilt deterministically in tests.

use crate::control::error::{AccessControlError, AccessControlResult};
use crate::control::processor::RequestProcessor;
use crate::facility::{Area, AreaDirectory, Door, DoorRegistry, DoorState, ExpiryScheduler};
use crate::permissions::{Schedule, User, UserDirectory, UserGroup, ALL_DAYS, WORKING_DAYS};
use crate::types::{Action, AreaId, DoorId};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use std::sync::Arc;

/// Every space a staff group may be granted, in grant order
const STAFF_SPACES: [&str; 11] = [
    "parking",
    "hall",
    "room1",
    "room2",
    "room3",
    "corridor",
    "IT",
    "exterior",
    "stairs_basement",
    "stairs_ground",
    "stairs_floor1",
];

/// Door id, space it leads from, space it leads into
const DOOR_LINKS: [(&str, &str, &str); 9] = [
    ("D1", "exterior", "parking"),
    ("D2", "stairs_basement", "parking"),
    ("D3", "exterior", "hall"),
    ("D4", "stairs_ground", "hall"),
    ("D5", "hall", "room1"),
    ("D6", "hall", "room2"),
    ("D7", "stairs_floor1", "corridor"),
    ("D8", "corridor", "room3"),
    ("D9", "corridor", "IT"),
];

/// Directories and doors of a site, ready to be shared
#[derive(Debug)]
pub struct Site {
    /// Groups and users
    pub users: UserDirectory,
    /// Area tree
    pub areas: AreaDirectory,
    /// Doors, not yet registered
    pub doors: Vec<Door>,
}

impl Site {
    /// Register the doors with `scheduler` and build a processor over the site
    pub fn into_processor(
        self,
        scheduler: Arc<dyn ExpiryScheduler>,
    ) -> AccessControlResult<RequestProcessor> {
        let doors = DoorRegistry::new(self.doors, scheduler)?;
        Ok(RequestProcessor::new(Arc::new(self.users), Arc::new(self.areas), Arc::new(doors)))
    }
}

fn date(year: i32, month: u32, day: u32) -> AccessControlResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AccessControlError::configuration_error(format!("invalid date {}-{}-{}", year, month, day))
    })
}

fn time(hour: u32, minute: u32) -> AccessControlResult<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        AccessControlError::configuration_error(format!("invalid time {}:{}", hour, minute))
    })
}

fn demo_areas() -> AreaDirectory {
    let basement = Area::partition("basement", "Basement")
        .with_child(Area::space("stairs_basement", "Stairs (basement)"))
        .with_child(Area::space("parking", "Parking"));
    let ground_floor = Area::partition("ground_floor", "Ground floor")
        .with_child(Area::space("stairs_ground", "Stairs (ground)"))
        .with_child(Area::space("hall", "Hall"))
        .with_child(Area::space("room1", "Room 1"))
        .with_child(Area::space("room2", "Room 2"))
        .with_child(Area::space("rest_room", "Rest room"));
    let floor1 = Area::partition("floor1", "First floor")
        .with_child(Area::space("stairs_floor1", "Stairs (floor1)"))
        .with_child(Area::space("corridor", "Corridor"))
        .with_child(Area::space("room3", "Room 3"))
        .with_child(Area::space("IT", "IT"));

    let building = Area::partition("building", "Building")
        .with_child(basement)
        .with_child(ground_floor)
        .with_child(floor1)
        .with_child(Area::space("exterior", "Exterior"));
    AreaDirectory::new(building)
}

fn demo_users(today: NaiveDate) -> AccessControlResult<UserDirectory> {
    let year = today.year();
    let all_areas = STAFF_SPACES.iter().map(|&id| AreaId::from(id));
    let employee_areas = STAFF_SPACES.iter().filter(|&&id| id != "parking").map(|&id| AreaId::from(id));
    let term_start = date(year, 9, 1)?;
    let term_end = date(year + 1, 3, 1)?;
    let mon_to_sat = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    let mut users = UserDirectory::new();

    let admins = users.add_group(UserGroup::new(
        "Administrators",
        Action::ALL,
        all_areas.clone(),
        Schedule::new(date(year, 1, 1)?, date(2100, 1, 1)?, ALL_DAYS, time(0, 0)?, time(23, 59)?),
    ));
    let managers = users.add_group(UserGroup::new(
        "Managers",
        Action::ALL,
        all_areas,
        Schedule::new(term_start, term_end, mon_to_sat, time(8, 0)?, time(20, 0)?),
    ));
    let employees = users.add_group(UserGroup::new(
        "Employees",
        [Action::Open, Action::Close, Action::UnlockShortly],
        employee_areas,
        Schedule::new(term_start, term_end, WORKING_DAYS, time(9, 0)?, time(17, 0)?),
    ));
    let blank = users.add_group(UserGroup::new("Blank", [], [], Schedule::never(today)));

    users.add_user(User::new("Ana", "11343", admins));
    users.add_user(User::new("Manel", "95783", Arc::clone(&managers)));
    users.add_user(User::new("Marta", "05827", managers));
    users.add_user(User::new("Ernest", "74984", Arc::clone(&employees)));
    users.add_user(User::new("Eulalia", "43295", employees));
    users.add_user(User::new("Bernat", "12345", Arc::clone(&blank)));
    users.add_user(User::new("Blai", "77532", blank));

    Ok(users)
}

/// The demo building with every door closed and unlocked
pub fn demo_building(today: NaiveDate) -> AccessControlResult<Site> {
    demo_building_with(today, true)
}

/// The demo building, choosing whether doors start closed
pub fn demo_building_with(today: NaiveDate, doors_closed: bool) -> AccessControlResult<Site> {
    let mut areas = demo_areas();
    let mut doors = Vec::with_capacity(DOOR_LINKS.len());

    for (id, from, to) in DOOR_LINKS {
        let mut door = Door::with_state(id, doors_closed, DoorState::Unlocked);
        door.link(AreaId::from(from), AreaId::from(to));
        if !areas.add_door_to_space(&AreaId::from(to), DoorId::from(id)) {
            return Err(AccessControlError::configuration_error(format!(
                "door {} leads into unknown space {}",
                id, to
            )));
        }
        doors.push(door);
    }

    let users = demo_users(today)?;
    tracing::info!(doors = doors.len(), users = users.user_count(), "Demo building seeded");
    Ok(Site { users, areas, doors })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()
    }

    #[test]
    fn test_demo_building_layout() {
        let site = demo_building(today()).unwrap();
        assert_eq!(site.doors.len(), 9);
        assert!(site.doors.iter().all(|d| d.is_closed()));

        let ground = site.areas.doors_in(&AreaId::from("ground_floor")).unwrap();
        let ids: Vec<_> = ground.iter().map(|d| d.as_str()).collect();
        assert_eq!(ids, vec!["D3", "D4", "D5", "D6"]);

        let parking = site.areas.doors_in(&AreaId::from("parking")).unwrap();
        assert_eq!(parking, vec![DoorId::from("D1"), DoorId::from("D2")]);
        assert_eq!(site.areas.doors_in(&AreaId::from("building")).unwrap().len(), 9);
    }

    #[test]
    fn test_demo_groups() {
        let site = demo_building(today()).unwrap();
        assert_eq!(site.users.user_count(), 7);

        let employees = site.users.find_group("Employees").unwrap();
        assert!(!employees.allows_area(&AreaId::from("parking")));
        assert!(employees.allows_area(&AreaId::from("hall")));
        assert!(!employees.allows_action(Action::Lock));

        let blank = site.users.find_group("Blank").unwrap();
        assert!(blank.schedule.is_never());
        assert_eq!(site.users.members_of("Blank").len(), 2);

        let manager = site.users.find_user_by_credential("05827").unwrap();
        assert_eq!(manager.name, "Marta");
    }

    #[test]
    fn test_doors_can_start_open() {
        let site = demo_building_with(today(), false).unwrap();
        assert!(site.doors.iter().all(|d| !d.is_closed()));
    }
}
