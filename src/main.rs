#![warn(unused_extern_crates)]

mod cli;

use clap::Parser;
use log::debug;
use s1ap_per::s1ap::Message;
use s1ap_per::s1ap::S1AP_PDU;
use s1ap_per::syn::io::PerDecoder;
use std::process::ExitCode;

pub fn main() -> ExitCode {
    env_logger::init();
    let params = cli::Parameters::parse();

    let input = match params.input_bytes() {
        Ok(input) => input,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut decoder = PerDecoder::new(input, params.alignment.into());
    let pdu = match decoder.decode(&S1AP_PDU) {
        Ok(pdu) => pdu,
        Err(e) => {
            eprintln!("Failed to decode the S1AP-PDU, reason: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!(
        "Decoded {} octets, {} bits remaining",
        decoder.consumed_bytes(),
        decoder.bits_remaining()
    );

    if params.json {
        return match serde_json::to_string_pretty(&pdu) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to serialize the S1AP-PDU, reason: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match Message::from_pdu(&pdu) {
        Ok(message) => {
            println!(
                "{:?} procedureCode={} criticality={:?}",
                message.kind, message.procedure_code, message.criticality
            );
            for ie in &message.ies {
                println!(
                    "    id={:<5} criticality={:<7} value={}",
                    ie.id,
                    format!("{:?}", ie.criticality),
                    ie.value.to_hex()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to interpret the S1AP-PDU, reason: {e}");
            ExitCode::FAILURE
        }
    }
}
