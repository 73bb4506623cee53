use clerk_core::date_range::{add_date_range_option, date_range_option, DateRangeNames};
use clerk_core::Registry;

/// Closure command printing the period selected with the date range options.
pub fn register(registry: &mut Registry) {
    registry
        .command("example:report", |cx| {
            let (from, to) = date_range_option(cx, &DateRangeNames::default())?;
            match (from, to) {
                (Some(from), Some(to)) => cx.info(format!("Report from {} to {}", from, to)),
                (Some(from), None) => cx.info(format!("Report from {}", from)),
                (None, Some(to)) => cx.info(format!("Report until {}", to)),
                (None, None) => cx.comment("Report for all dates"),
            }
            Ok(())
        })
        .purpose("Print the report period")
        .input(|definition| add_date_range_option(definition, &DateRangeNames::default()));
}
