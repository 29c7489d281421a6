use super::PlaceKind::{self, City, Country, Region};

/// (canonical name, kind, extra aliases). The lowercased canonical name is
/// always an alias of itself.
pub(super) const PLACES: &[(&str, PlaceKind, &[&str])] = &[
    // Countries
    ("United States", Country, &["usa", "us", "america", "united states of america"]),
    ("United Kingdom", Country, &["uk", "great britain", "britain"]),
    ("Ireland", Country, &["eire"]),
    ("France", Country, &[]),
    ("Italy", Country, &[]),
    ("Spain", Country, &[]),
    ("Portugal", Country, &[]),
    ("Germany", Country, &[]),
    ("Switzerland", Country, &[]),
    ("Austria", Country, &[]),
    ("Netherlands", Country, &["holland", "the netherlands"]),
    ("Belgium", Country, &[]),
    ("Greece", Country, &[]),
    ("Norway", Country, &[]),
    ("Sweden", Country, &[]),
    ("Iceland", Country, &[]),
    ("Poland", Country, &[]),
    ("Czechia", Country, &["czech republic"]),
    ("Croatia", Country, &[]),
    ("Turkey", Country, &["turkiye"]),
    ("Nepal", Country, &[]),
    ("India", Country, &[]),
    ("China", Country, &[]),
    ("Japan", Country, &[]),
    ("Thailand", Country, &[]),
    ("Vietnam", Country, &[]),
    ("Indonesia", Country, &[]),
    ("Australia", Country, &[]),
    ("New Zealand", Country, &[]),
    ("Canada", Country, &[]),
    ("Mexico", Country, &[]),
    ("Brazil", Country, &[]),
    ("Argentina", Country, &[]),
    ("Chile", Country, &[]),
    ("Peru", Country, &[]),
    ("Egypt", Country, &[]),
    ("Morocco", Country, &[]),
    ("Kenya", Country, &[]),
    ("South Africa", Country, &[]),
    // Regions and geographic features
    ("Europe", Region, &[]),
    ("Asia", Region, &[]),
    ("Africa", Region, &[]),
    ("Scandinavia", Region, &[]),
    ("Caribbean", Region, &["the caribbean"]),
    ("Alps", Region, &["the alps"]),
    ("Himalayas", Region, &["the himalayas"]),
    ("Rockies", Region, &["rocky mountains", "the rockies"]),
    ("California", Region, &["socal", "norcal"]),
    ("Florida", Region, &[]),
    ("Alaska", Region, &[]),
    ("Hawaii", Region, &[]),
    ("Scotland", Region, &[]),
    ("England", Region, &[]),
    ("Wales", Region, &[]),
    ("Bavaria", Region, &["bayern"]),
    ("Tuscany", Region, &["toscana"]),
    ("Provence", Region, &[]),
    ("Amalfi Coast", Region, &["amalfi"]),
    ("Costa Brava", Region, &[]),
    // Cities
    ("New York", City, &["nyc", "new york city", "big apple", "the big apple"]),
    ("Los Angeles", City, &["la"]),
    ("San Francisco", City, &["sf"]),
    ("Chicago", City, &[]),
    ("Miami", City, &[]),
    ("Seattle", City, &[]),
    ("Boston", City, &[]),
    ("Toronto", City, &[]),
    ("Vancouver", City, &[]),
    ("Montreal", City, &[]),
    ("London", City, &[]),
    ("Paris", City, &[]),
    ("Marseille", City, &["marseilles"]),
    ("Lyon", City, &[]),
    ("Rome", City, &["roma"]),
    ("Milan", City, &["milano"]),
    ("Venice", City, &["venezia"]),
    ("Florence", City, &["firenze"]),
    ("Naples", City, &["napoli"]),
    ("Madrid", City, &[]),
    ("Barcelona", City, &[]),
    ("Seville", City, &["sevilla"]),
    ("Valencia", City, &[]),
    ("Lisbon", City, &["lisboa"]),
    ("Porto", City, &[]),
    ("Berlin", City, &[]),
    ("Munich", City, &["munchen", "münchen"]),
    ("Hamburg", City, &[]),
    ("Zurich", City, &["zürich"]),
    ("Geneva", City, &["geneve", "genève"]),
    ("Vienna", City, &["wien"]),
    ("Amsterdam", City, &[]),
    ("Brussels", City, &[]),
    ("Prague", City, &["praha"]),
    ("Warsaw", City, &[]),
    ("Athens", City, &[]),
    ("Istanbul", City, &[]),
    ("Oslo", City, &[]),
    ("Stockholm", City, &[]),
    ("Copenhagen", City, &[]),
    ("Reykjavik", City, &[]),
    ("Dublin", City, &[]),
    ("Edinburgh", City, &[]),
    ("Kathmandu", City, &[]),
    ("Tokyo", City, &[]),
    ("Osaka", City, &[]),
    ("Kyoto", City, &[]),
    ("Seoul", City, &[]),
    ("Beijing", City, &[]),
    ("Shanghai", City, &[]),
    ("Hong Kong", City, &[]),
    ("Singapore", City, &[]),
    ("Bangkok", City, &[]),
    ("Mumbai", City, &["bombay"]),
    ("Delhi", City, &["new delhi"]),
    ("Dubai", City, &[]),
    ("Cairo", City, &[]),
    ("Marrakech", City, &["marrakesh"]),
    ("Nairobi", City, &[]),
    ("Cape Town", City, &[]),
    ("Sydney", City, &[]),
    ("Melbourne", City, &[]),
    ("Auckland", City, &[]),
    ("Rio de Janeiro", City, &["rio"]),
    ("Buenos Aires", City, &[]),
    ("Mexico City", City, &["cdmx"]),
    ("Lima", City, &[]),
];
