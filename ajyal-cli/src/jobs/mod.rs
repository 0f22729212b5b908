pub mod export_run;
