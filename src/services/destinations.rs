//! Climbing destination catalog.
//!
//! Each destination resolves to the nearest town that OpenWeatherMap
//! forecasts well; coordinates are that town's, not the crag's.

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    /// Display name, also the lookup key (e.g. "Red River Gorge, KY")
    pub name: &'static str,
    /// Town used for the forecast
    pub city: &'static str,
    /// ISO 3166 country code
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

const fn dest(
    name: &'static str,
    city: &'static str,
    latitude: f64,
    longitude: f64,
) -> Destination {
    Destination {
        name,
        city,
        country: "US",
        latitude,
        longitude,
    }
}

pub static DESTINATIONS: &[Destination] = &[
    dest("Black Canyon of the Gunnison, CO", "Montrose", 38.4783, -107.8762),
    dest("Bishop, CA", "Bishop", 37.3635, -118.3951),
    dest("Boone, NC", "Boone", 36.2168, -81.6746),
    dest("Chattanooga, TN", "Chattanooga", 35.0456, -85.3097),
    dest("Devils Tower National Monument, WY", "Devils Tower", 44.5902, -104.7146),
    dest("Flagstaff, AZ", "Flagstaff", 35.1983, -111.6513),
    dest("Hueco Tanks State Historic Site, TX", "El Paso", 31.7619, -106.4850),
    dest("Indian Creek, UT", "Moab", 38.5733, -109.5498),
    dest("Joshua Tree National Park, CA", "Palm Springs", 33.8303, -116.5453),
    dest("Lander, WY", "Lander", 42.8330, -108.7307),
    dest("Leavenworth, WA", "Leavenworth", 47.5962, -120.6615),
    dest("Little Cottonwood Canyon, UT", "Salt Lake City", 40.7608, -111.8910),
    dest("Looking Glass Rock, NC", "Brevard", 35.2334, -82.7343),
    dest("Maple Canyon, UT", "Moroni", 39.5250, -111.5866),
    dest("New River Gorge National Park, WV", "Fayetteville", 38.0529, -81.1040),
    dest("Red River Gorge, KY", "Slade", 37.7937, -83.7063),
    dest("Red Rock Canyon, NV", "Las Vegas", 36.1699, -115.1398),
    dest("Rifle Mountain Park, CO", "Rifle", 39.5347, -107.7831),
    dest("Rocky Mountain National Park, CO", "Estes Park", 40.3772, -105.5217),
    dest("Rumney, NH", "Plymouth", 43.7570, -71.6881),
    dest("Shawangunks, NY", "Gardiner", 41.6795, -74.1515),
    dest("Smith Rock State Park, OR", "Terrebonne", 44.3529, -121.1778),
    dest("Tacoma, WA", "Tacoma", 47.2529, -122.4443),
    dest("The Needles, CA", "Springville", 36.1302, -118.8187),
    dest("Yosemite National Park, CA", "Yosemite Valley", 37.7459, -119.5936),
    dest("Zion National Park, UT", "Springdale", 37.1889, -112.9986),
];

/// Look up a destination by its exact display name.
pub fn find_destination(name: &str) -> Result<&'static Destination, AppError> {
    let name = name.trim();
    DESTINATIONS
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| AppError::InvalidDestination(name.to_string()))
}
