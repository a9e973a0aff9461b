mod time_records;
mod work_sessions;
