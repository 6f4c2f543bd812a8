mod actor_framework;
mod app_system;
mod clients;
mod domain;
mod error;
mod session;

#[cfg(test)]
mod mock_framework;

use std::str::FromStr;

use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};

use crate::app_system::{setup_tracing, MachineConfig, SodaMachineSystem};
use crate::domain::name_for_key;
use crate::session::{PurchaseMode, SelectOutcome, Session};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = MachineConfig::load().map_err(|e| e.to_string())?;
    info!(mode = ?config.settlement_mode, "Configuration loaded");

    let system = SodaMachineSystem::start(&config).await.map_err(|e| e.to_string())?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("=========================================");
    println!("     Welcome to Automated Soda Machine   ");
    println!("=========================================");
    println!("Press c to buy soda with cash, s to order with sms, q to quit");

    let mode = loop {
        match next_line(&mut input).await.as_deref() {
            Some("c") => break Some(PurchaseMode::Cash),
            Some("s") => break Some(PurchaseMode::Sms),
            Some("q") | None => break None,
            Some(other) => println!("Please choose c, s or q instead of '{}'", other),
        }
    };

    if let Some(mode) = mode {
        match Session::open(system.transaction_client.clone(), mode).await {
            Ok(session) => run_session(session, &mut input).await,
            Err(e) => error!(error = %e, "Could not open session"),
        }
    }

    system.shutdown().await?;
    Ok(())
}

async fn next_line(input: &mut Input) -> Option<String> {
    match input.next_line().await {
        Ok(Some(line)) => Some(line.trim().to_lowercase()),
        Ok(None) => None,
        Err(e) => {
            error!(error = %e, "Failed to read input");
            None
        }
    }
}

fn print_menu(mode: PurchaseMode) {
    if mode == PurchaseMode::Cash {
        println!("Type 'i <amount>' to insert money");
    }
    println!("Press 1 to select Coke, 2 to select Fanta, 3 to select Sprite, q to quit");
}

async fn run_session(mut session: Session, input: &mut Input) {
    print_menu(session.mode());

    while let Some(line) = next_line(input).await {
        if line == "q" {
            break;
        }

        if let Some(amount) = line.strip_prefix('i') {
            match Decimal::from_str(amount.trim()) {
                Ok(amount) => match session.insert_money(amount).await {
                    Ok(balance) => println!("Your balance is {}/-", balance),
                    Err(e) => println!("{}", e),
                },
                Err(_) => println!("Please provide an amount more than zero instead of '{}'", amount.trim()),
            }
            continue;
        }

        let Some(name) = name_for_key(&line) else {
            println!("Please press 1 (Coke), 2 (Fanta) or 3 (Sprite) instead of '{}'", line);
            continue;
        };

        match session.select(name).await {
            Ok(SelectOutcome::Purchased(receipt)) => {
                println!("You bought {} for {}/-", receipt.soda, receipt.price);
                match session.mode() {
                    PurchaseMode::Cash => println!("Your balance is {}/-", receipt.balance),
                    PurchaseMode::Sms => println!("Remaining {}: {}", receipt.soda, receipt.remaining),
                }
            }
            Ok(SelectOutcome::NotEnoughMoney { balance, price }) => {
                println!("The amount {}/- you have is not enough for a soda costing {}/-", balance, price);
            }
            Ok(SelectOutcome::SoldOut { soda }) => println!("{} is out of stock. Please try later.", soda),
            Err(e) => println!("{}", e),
        }

        if session.is_done() {
            break;
        }
        println!("To buy another soda choose again, or press q to quit");
    }

    let mode = session.mode();
    let balance = session.recall().await;
    if mode == PurchaseMode::Cash {
        println!("Returning money {}/-", balance);
    }
    println!("Thank you for using Soda Machine");
}
