use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?7\d{10}$").expect("valid phone regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{4}$").expect("valid date regex"));
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{1,2}:[0-9]{1,2}$").expect("valid time regex"));

/// Телефон вида +7XXXXXXXXXX или 7XXXXXXXXXX, пробелы и дефисы игнорируются
pub fn validate_phone(phone: &str) -> bool {
    let normalized: String = phone.chars().filter(|c| *c != ' ' && *c != '-').collect();
    PHONE_RE.is_match(&normalized)
}

/// Дата ДД.ММ.ГГГГ строго позже `now`.
/// Полночь указанного дня сравнивается с `now`, поэтому сегодняшняя дата уже не проходит
pub fn validate_date_at(date: &str, now: NaiveDateTime) -> bool {
    let date = date.trim();
    if !DATE_RE.is_match(date) {
        return false;
    }
    match NaiveDate::parse_from_str(date, "%d.%m.%Y") {
        Ok(day) => day.and_time(NaiveTime::MIN) > now,
        Err(_) => false,
    }
}

/// Время ЧЧ:ММ в 24-часовом формате, без ограничений по часам работы
pub fn validate_time(time: &str) -> bool {
    let time = time.trim();
    TIME_RE.is_match(time) && NaiveTime::parse_from_str(time, "%H:%M").is_ok()
}
