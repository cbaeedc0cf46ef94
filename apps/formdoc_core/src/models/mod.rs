pub mod contact_record;
