//! The facade surface used the way a host would use it.

use waypoint::prelude::*;
use waypoint::{Recovery, report_errors};
use waypoint_harness::{TourFixture, capture_warnings};

#[test]
fn prelude_covers_a_basic_tour() {
    let mut fx = TourFixture::new();
    fx.mount("search").unwrap();

    let tour: &mut TourService = &mut fx.tour;
    tour.initialize(&[StepOption::anchored("search").title("Search")], None)
        .unwrap();
    tour.start();
    tour.update(TourMsg::Tick(std::time::Duration::from_millis(1)));
    assert_eq!(tour.status(), TourStatus::On);
    assert_eq!(
        tour.current_step().and_then(|s| s.title.as_deref()),
        Some("Search")
    );

    assert!(tour.handle_key(KeyEvent::new(KeyCode::Escape)));
    assert_eq!(tour.status(), TourStatus::Off);
}

#[test]
fn registration_errors_convert_into_the_facade_error() {
    fn mount_twice(fx: &mut TourFixture) -> waypoint::Result<()> {
        fx.mount("nav")?;
        fx.mount("nav")?;
        Ok(())
    }

    let mut fx = TourFixture::new();
    let err = mount_twice(&mut fx).unwrap_err();
    assert!(matches!(err, Error::Tour(waypoint::TourError::DuplicateAnchor { .. })));
    assert_eq!(err.recovery(), Recovery::FailCall);
}

#[test]
fn published_errors_are_reported() {
    let mut fx = TourFixture::new();
    let _reporter = report_errors(fx.tour.events());
    fx.tour
        .initialize(&[StepOption::anchored("ghost")], None)
        .unwrap();

    let warnings = capture_warnings(|| {
        fx.tour.start();
        fx.advance_ms(1);
    });
    assert!(
        warnings
            .iter()
            .any(|w| w.starts_with("tour error: can't attach to unregistered anchor")),
        "{warnings:?}"
    );
}
